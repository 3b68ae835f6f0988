//! Batched construction of the incidence matrix from the knowledge store.
//!
//! Paper ids are processed in contiguous batches. Each batch queries the
//! per-paper author/chemical/affiliation memberships and sets the matching
//! entries; keyword columns are filled afterwards from keyword-set queries.
//! Every `snapshot_every` completed rows the matrix is persisted in
//! compressed-column form so a failed or cancelled build can resume from the
//! last snapshot boundary. A cooperative cancellation flag is checked at each
//! batch boundary.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::dimensions::{GraphDimensions, NodeClass};
use crate::error::{GraphError, Result};
use crate::matrix::IncidenceMatrix;
use crate::progress::{NoopSink, ProgressEvent, ProgressSink};
use crate::store::{EntityClass, KnowledgeStore};

/// Tuning and wiring for one build run.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Papers fetched per store round-trip.
    pub batch_size: usize,
    /// Rows between on-disk snapshots.
    pub snapshot_every: usize,
    /// Snapshot destination; `None` disables snapshots.
    pub snapshot_path: Option<PathBuf>,
    /// One keyword query set per keyword column, in column order.
    pub keyword_queries: Vec<Vec<String>>,
    /// Keywords to match case-sensitively.
    pub case_sensitive: Vec<String>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            batch_size: 1_000,
            snapshot_every: 50_000,
            snapshot_path: None,
            keyword_queries: Vec::new(),
            case_sensitive: Vec::new(),
        }
    }
}

pub struct IncidenceMatrixBuilder<'a, S: KnowledgeStore> {
    store: &'a S,
    dims: GraphDimensions,
    config: BuilderConfig,
    progress: Arc<dyn ProgressSink>,
    cancel: Arc<AtomicBool>,
}

impl<'a, S: KnowledgeStore> IncidenceMatrixBuilder<'a, S> {
    pub fn new(store: &'a S, dims: GraphDimensions, config: BuilderConfig) -> Self {
        Self {
            store,
            dims,
            config,
            progress: Arc::new(NoopSink),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Flag observed at batch boundaries; set it from another handle to stop
    /// the build after the current batch.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Build the full matrix from row 0.
    pub fn build(&self) -> Result<IncidenceMatrix> {
        let n_papers = self.store.count(EntityClass::Paper)?;
        let matrix = IncidenceMatrix::new(n_papers, self.dims.total_nodes());
        self.run(matrix, 0, n_papers)
    }

    /// Resume a build from an on-disk snapshot.
    pub fn resume(&self, snapshot: &std::path::Path) -> Result<IncidenceMatrix> {
        let (matrix, rows_done) = IncidenceMatrix::read_snapshot(snapshot)?;
        let n_papers = matrix.n_rows();
        info!(rows_done, n_papers, "resuming incidence build from snapshot");
        self.run(matrix, rows_done, n_papers)
    }

    fn run(
        &self,
        mut matrix: IncidenceMatrix,
        start_row: usize,
        n_papers: usize,
    ) -> Result<IncidenceMatrix> {
        if self.config.keyword_queries.len() != self.dims.keywords {
            return Err(GraphError::invalid(format!(
                "{} keyword queries for {} keyword columns",
                self.config.keyword_queries.len(),
                self.dims.keywords
            )));
        }
        if self.config.batch_size == 0 {
            return Err(GraphError::invalid("batch_size must be positive"));
        }

        let membership_classes: &[(EntityClass, NodeClass)] = &[
            (EntityClass::Author, NodeClass::Author),
            (EntityClass::Chemical, NodeClass::Chemical),
            (EntityClass::Affiliation, NodeClass::Affiliation),
        ];

        let mut batch_start = start_row;
        let mut last_snapshot = start_row;
        while batch_start < n_papers {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(GraphError::Cancelled(batch_start));
            }
            let batch_end = (batch_start + self.config.batch_size).min(n_papers);
            let range = batch_start as u32..batch_end as u32;

            for &(entity, node) in membership_classes {
                if self.dims.range_of(node).is_empty() {
                    continue;
                }
                for membership in self.store.memberships(entity, range.clone())? {
                    for &local in &membership.member_ids {
                        let col = self.dims.global_index(node, local as usize);
                        matrix.insert(membership.paper_id as usize, col);
                    }
                }
            }

            self.progress.report(&ProgressEvent {
                stage: "incidence-build",
                processed: batch_end,
                total: n_papers,
                stats: None,
            });
            debug!(batch_start, batch_end, "incidence batch done");

            if let Some(path) = &self.config.snapshot_path {
                if batch_end - last_snapshot >= self.config.snapshot_every || batch_end == n_papers
                {
                    matrix.normalize();
                    matrix.write_snapshot(path, batch_end)?;
                    last_snapshot = batch_end;
                    debug!(rows_done = batch_end, "snapshot flushed");
                }
            }
            batch_start = batch_end;
        }

        // Keyword columns: one query per trailing column. A keyword hit also
        // marks the hit's author columns; the membership pass has already set
        // them, and entries are boolean, so re-inserting is harmless.
        for (k, query) in self.config.keyword_queries.iter().enumerate() {
            let col = self.dims.global_index(NodeClass::Keyword, k);
            for hit in
                self.store
                    .papers_by_keyword_set(query, None, &self.config.case_sensitive)?
            {
                matrix.insert(hit.paper_id as usize, col);
                for &author in &hit.author_ids {
                    matrix.insert(hit.paper_id as usize, author as usize);
                }
            }
        }

        matrix.normalize();
        info!(
            n_rows = matrix.n_rows(),
            n_cols = matrix.n_cols(),
            nnz = matrix.nnz(),
            "incidence matrix built"
        );
        Ok(matrix)
    }
}
