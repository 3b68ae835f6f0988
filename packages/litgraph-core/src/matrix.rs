//! Sparse boolean incidence matrix: hyperedges (papers) × nodes.
//!
//! Entries are 0/1 only. The matrix is stored as a dual adjacency: the sorted
//! column list of every row and the sorted row list of every column. Row `i`'s
//! nonzero count is the size of hyperedge `i`; column `j`'s nonzero count is
//! the degree of node `j`. Both directions are needed by the walk sampler and
//! the transition engine, and at 0/1 entries the dual lists cost exactly
//! `2·nnz` indices — no value array.
//!
//! Restriction operations (`select_rows`) return a new matrix; the original is
//! never mutated. Snapshots use a compressed-sparse-column encoding serialized
//! with bincode, carrying the number of completed rows so an interrupted build
//! can resume from the last flushed batch boundary.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{GraphError, Result};

/// Boolean hyperedge × node incidence matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
    /// Sorted column indices per row (hyperedge memberships).
    rows: Vec<Vec<u32>>,
    /// Sorted row indices per column (node incidences).
    cols: Vec<Vec<u32>>,
    /// Original paper id of each row. Identity for a freshly built matrix;
    /// preserved through row selection so provenance survives restriction.
    row_ids: Vec<u32>,
    n_cols: usize,
}

/// On-disk snapshot: compressed sparse column, plus resume position.
#[derive(Debug, Serialize, Deserialize)]
struct ColumnSnapshot {
    n_rows: u64,
    n_cols: u64,
    rows_done: u64,
    col_ptr: Vec<u64>,
    row_idx: Vec<u32>,
    row_ids: Vec<u32>,
}

impl IncidenceMatrix {
    /// Empty matrix of the given shape.
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        Self {
            rows: vec![Vec::new(); n_rows],
            cols: vec![Vec::new(); n_cols],
            row_ids: (0..n_rows as u32).collect(),
            n_cols,
        }
    }

    /// Build from per-row column sets. Duplicates are collapsed (entries are
    /// boolean).
    pub fn from_rows(row_cols: Vec<Vec<u32>>, n_cols: usize) -> Self {
        let n_rows = row_cols.len();
        let mut m = Self::new(n_rows, n_cols);
        for (i, cols) in row_cols.into_iter().enumerate() {
            for c in cols {
                m.insert(i, c as usize);
            }
        }
        m.normalize();
        m
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Sorted columns of row `i`: the nodes hyperedge `i` contains.
    pub fn row(&self, i: usize) -> &[u32] {
        &self.rows[i]
    }

    /// Sorted rows of column `j`: the hyperedges incident to node `j`.
    pub fn col(&self, j: usize) -> &[u32] {
        &self.cols[j]
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.rows[row].binary_search(&(col as u32)).is_ok()
    }

    /// Size of hyperedge `i` (row nonzero count).
    pub fn hyperedge_size(&self, i: usize) -> usize {
        self.rows[i].len()
    }

    /// Degree of node `j` (column nonzero count).
    pub fn node_degree(&self, j: usize) -> usize {
        self.cols[j].len()
    }

    /// Original paper id of row `i`.
    pub fn row_id(&self, i: usize) -> u32 {
        self.row_ids[i]
    }

    pub fn row_ids(&self) -> &[u32] {
        &self.row_ids
    }

    /// Set entry (row, col) to 1. Lists are left unsorted until `normalize`.
    pub(crate) fn insert(&mut self, row: usize, col: usize) {
        self.rows[row].push(col as u32);
        self.cols[col].push(row as u32);
    }

    /// Sort and deduplicate both adjacency directions. Idempotent.
    pub(crate) fn normalize(&mut self) {
        for r in &mut self.rows {
            r.sort_unstable();
            r.dedup();
        }
        for c in &mut self.cols {
            c.sort_unstable();
            c.dedup();
        }
    }

    /// New matrix keeping only the given rows, in the given order. Column
    /// count is unchanged; zero-degree columns are not pruned. Row ids map
    /// through so the selected rows keep their original paper identity.
    pub fn select_rows(&self, keep: &[usize]) -> Self {
        let mut m = Self::new(keep.len(), self.n_cols);
        for (new_row, &old_row) in keep.iter().enumerate() {
            for &c in &self.rows[old_row] {
                m.insert(new_row, c as usize);
            }
            m.row_ids[new_row] = self.row_ids[old_row];
        }
        m.normalize();
        m
    }

    /// Persist a compressed-column snapshot. `rows_done` records how many
    /// leading rows are complete, for resumption.
    pub fn write_snapshot(&self, path: &Path, rows_done: usize) -> Result<()> {
        let mut col_ptr = Vec::with_capacity(self.n_cols + 1);
        let mut row_idx = Vec::with_capacity(self.nnz());
        col_ptr.push(0u64);
        for c in &self.cols {
            row_idx.extend_from_slice(c);
            col_ptr.push(row_idx.len() as u64);
        }
        let snapshot = ColumnSnapshot {
            n_rows: self.n_rows() as u64,
            n_cols: self.n_cols as u64,
            rows_done: rows_done as u64,
            col_ptr,
            row_idx,
            row_ids: self.row_ids.clone(),
        };
        let file = BufWriter::new(File::create(path)?);
        bincode::serialize_into(file, &snapshot)?;
        Ok(())
    }

    /// Load a snapshot, returning the matrix and the resume row.
    pub fn read_snapshot(path: &Path) -> Result<(Self, usize)> {
        let file = BufReader::new(File::open(path)?);
        let snapshot: ColumnSnapshot = bincode::deserialize_from(file)?;
        if snapshot.col_ptr.len() != snapshot.n_cols as usize + 1 {
            return Err(GraphError::Snapshot(format!(
                "column pointer length {} does not match {} columns",
                snapshot.col_ptr.len(),
                snapshot.n_cols
            )));
        }
        let mut m = Self::new(snapshot.n_rows as usize, snapshot.n_cols as usize);
        for j in 0..snapshot.n_cols as usize {
            let (lo, hi) = (snapshot.col_ptr[j] as usize, snapshot.col_ptr[j + 1] as usize);
            for &r in &snapshot.row_idx[lo..hi] {
                m.insert(r as usize, j);
            }
        }
        m.row_ids = snapshot.row_ids;
        m.normalize();
        Ok((m, snapshot.rows_done as usize))
    }
}
