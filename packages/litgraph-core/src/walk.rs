//! Weighted random walks over the hypergraph, and corpus generation.
//!
//! A walk alternates node → hyperedge → node. At the current node the sampler
//! draws one incident hyperedge (weights = the node's column slice, uniform
//! for a boolean matrix), then one node within that hyperedge after the
//! weighting policy has reshaped the candidate weights. Both draws use
//! cumulative-sum inverse-transform sampling against an explicit RNG handle —
//! there is no global random state anywhere in this module.
//!
//! Dead ends are not errors: a mid-walk node with no incident hyperedges, or
//! a policy that zeroes every candidate, terminates the walk early and the
//! sequence gathered so far is returned. Only a non-lazy walk started at an
//! isolated node fails (`IsolatedStart`).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::dimensions::{GraphDimensions, NodeClass};
use crate::error::{GraphError, Result};
use crate::matrix::IncidenceMatrix;
use crate::progress::{ProgressEvent, ProgressSink, RunningStats};

/// Node-weighting policy applied at every walk step.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightingPolicy {
    /// Keep candidate weights as they are.
    Plain,
    /// Zero all non-chemical weights.
    ChemicalOnly,
    /// Zero all non-author weights.
    AuthorOnly,
    /// Split mass so that chemical total = `alpha` × author total. The
    /// trailing keyword columns are folded into the author group — a
    /// modeling conflation of two node types, preserved for compatibility
    /// with existing corpora. Affiliations are zeroed.
    AlphaRatio(f64),
    /// Mixture coefficients over {author(+keyword), chemical, affiliation},
    /// summing to 1; coefficients of absent (zero-mass) groups are
    /// redistributed over the present ones.
    AffiliationMixture(Vec<f64>),
}

/// Group index for the three-way mixture: author(+keyword), chemical,
/// affiliation.
fn mixture_group(dims: &GraphDimensions, col: usize) -> usize {
    match dims.class_of(col) {
        Some(NodeClass::Chemical) => 1,
        Some(NodeClass::Affiliation) => 2,
        _ => 0,
    }
}

impl WeightingPolicy {
    /// Fail fast on malformed parameters, before any sampling happens.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::AlphaRatio(alpha) => {
                if !alpha.is_finite() || *alpha < 0.0 {
                    return Err(GraphError::invalid(format!(
                        "alpha must be finite and non-negative, got {alpha}"
                    )));
                }
            }
            Self::AffiliationMixture(coefs) => {
                if coefs.len() != 3 {
                    return Err(GraphError::invalid(format!(
                        "mixture must have 3 coefficients, got {}",
                        coefs.len()
                    )));
                }
                if coefs.iter().any(|c| !c.is_finite() || *c < 0.0) {
                    return Err(GraphError::invalid(
                        "mixture coefficients must be finite and non-negative",
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Reshape candidate weights in place. `cols[i]` is the global column of
    /// `weights[i]`. An all-zero result means "terminate the walk", never an
    /// error.
    pub fn apply(&self, dims: &GraphDimensions, cols: &[usize], weights: &mut [f64]) {
        match self {
            Self::Plain => {}
            Self::ChemicalOnly => {
                for (i, &c) in cols.iter().enumerate() {
                    if dims.class_of(c) != Some(NodeClass::Chemical) {
                        weights[i] = 0.0;
                    }
                }
            }
            Self::AuthorOnly => {
                for (i, &c) in cols.iter().enumerate() {
                    if dims.class_of(c) != Some(NodeClass::Author) {
                        weights[i] = 0.0;
                    }
                }
            }
            Self::AlphaRatio(alpha) => {
                let mut masses = [0.0f64; 3];
                for (i, &c) in cols.iter().enumerate() {
                    masses[mixture_group(dims, c)] += weights[i];
                }
                let (author_mass, chem_mass) = (masses[0], masses[1]);
                for (i, &c) in cols.iter().enumerate() {
                    match mixture_group(dims, c) {
                        0 if author_mass > 0.0 && chem_mass > 0.0 => {
                            weights[i] /= author_mass;
                        }
                        1 if author_mass > 0.0 && chem_mass > 0.0 => {
                            weights[i] *= alpha / chem_mass;
                        }
                        0 if author_mass > 0.0 => weights[i] /= author_mass,
                        1 if chem_mass > 0.0 => weights[i] /= chem_mass,
                        2 => weights[i] = 0.0,
                        _ => {}
                    }
                }
            }
            Self::AffiliationMixture(coefs) => {
                let mut masses = [0.0f64; 3];
                for (i, &c) in cols.iter().enumerate() {
                    masses[mixture_group(dims, c)] += weights[i];
                }
                let denom: f64 = (0..3)
                    .filter(|&g| masses[g] > 0.0)
                    .map(|g| coefs[g])
                    .sum();
                if denom <= 0.0 {
                    weights.iter_mut().for_each(|w| *w = 0.0);
                    return;
                }
                for (i, &c) in cols.iter().enumerate() {
                    let g = mixture_group(dims, c);
                    if masses[g] > 0.0 {
                        weights[i] *= coefs[g] / denom / masses[g];
                    }
                }
            }
        }
    }
}

/// Inverse-transform draw from unnormalized weights. `None` when the total
/// mass is not positive.
fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let draw = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if draw < cumulative {
            return Some(i);
        }
    }
    last_positive // rounding fell off the end; take the last positive weight
}

/// One sampled walk: `nodes.len() == edges.len() + 1`, with `edges[i]` the
/// hyperedge crossed between `nodes[i]` and `nodes[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
}

/// Sample one weighted walk of up to `length` nodes starting at `start`.
///
/// `lazy` permits staying on the current node (self-transition); non-lazy
/// zeroes the current node out of the candidates. Early termination (dead
/// end, all-zero policy result) returns the shorter sequence; only a
/// degree-zero start in non-lazy mode is an error.
pub fn sample_walk<R: Rng + ?Sized>(
    r: &IncidenceMatrix,
    dims: &GraphDimensions,
    start: usize,
    length: usize,
    lazy: bool,
    policy: &WeightingPolicy,
    rng: &mut R,
) -> Result<Walk> {
    policy.validate()?;
    if r.col(start).is_empty() && !lazy {
        return Err(GraphError::IsolatedStart(start));
    }

    let mut nodes = vec![start];
    let mut edges = Vec::new();

    while nodes.len() < length {
        let v = *nodes.last().expect("walk never empty");
        let incident = r.col(v);
        if incident.is_empty() {
            break;
        }
        // Boolean matrix: every incident hyperedge contributes weight 1.
        let edge_weights = vec![1.0; incident.len()];
        let e = incident[sample_index(&edge_weights, rng).expect("nonempty incidence")] as usize;

        let cand_cols: Vec<usize> = r.row(e).iter().map(|&u| u as usize).collect();
        let mut cand_weights = vec![1.0; cand_cols.len()];
        if !lazy {
            for (i, &c) in cand_cols.iter().enumerate() {
                if c == v {
                    cand_weights[i] = 0.0;
                }
            }
        }
        policy.apply(dims, &cand_cols, &mut cand_weights);

        match sample_index(&cand_weights, rng) {
            Some(i) => {
                nodes.push(cand_cols[i]);
                edges.push(e);
            }
            None => break,
        }
    }
    Ok(Walk { nodes, edges })
}

// ─────────────────────────────────────────────
// Corpus generation
// ─────────────────────────────────────────────

/// Batched line sink for streamed corpus output.
pub trait BatchSink {
    fn write_batch(&mut self, lines: &[String]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// Appending plain-text file sink, one line per walk.
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn append(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl BatchSink for FileSink {
    fn write_batch(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.writer, "{}", line)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// In-memory sink, the test double for `FileSink`.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
    pub flushes: usize,
}

impl BatchSink for MemorySink {
    fn write_batch(&mut self, lines: &[String]) -> Result<()> {
        self.lines.extend_from_slice(lines);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

/// Chemical column names, for token rendering.
#[derive(Debug, Clone)]
pub struct NodeVocabulary<'a> {
    /// `chemical_names[i]` names local chemical index `i`.
    pub chemical_names: &'a [String],
}

/// Corpus-generation parameters.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Number of independent walks.
    pub count: usize,
    /// Requested nodes per walk.
    pub length: usize,
    /// Chemical-to-author mass ratio of the alpha-ratio policy driving the
    /// walks.
    pub alpha: f64,
    /// Token emitted for keyword-block nodes.
    pub keyword_label: String,
    /// Base seed; `None` for entropy-seeded, irreproducible walks.
    pub seed: Option<u64>,
    /// Walks per sink flush.
    pub flush_every: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            count: 100,
            length: 20,
            alpha: 1.0,
            keyword_label: "keyword".into(),
            seed: None,
            flush_every: 200,
        }
    }
}

fn render_token(
    dims: &GraphDimensions,
    vocab: &NodeVocabulary<'_>,
    keyword_label: &str,
    node: usize,
) -> String {
    match dims.split(node) {
        Some((NodeClass::Author, i)) => format!("a_{}", i),
        Some((NodeClass::Affiliation, i)) => format!("aff_{}", i),
        Some((NodeClass::Chemical, i)) => vocab.chemical_names[i].clone(),
        _ => keyword_label.to_string(),
    }
}

/// Generate `config.count` walks starting from the property keyword (the last
/// column) and stream them as parallel token / hyperedge-id sentences.
///
/// With a base seed, walk `i` runs on `StdRng::seed_from_u64(seed + inc[i])`
/// where the increments `0..count` are pre-shuffled by the base seed: the
/// same base seed reproduces the same multiset of walks. Sentences go to the
/// sinks in `flush_every`-sized batches; the final partial batch is flushed
/// at completion.
pub fn generate_corpus(
    r: &IncidenceMatrix,
    dims: &GraphDimensions,
    vocab: &NodeVocabulary<'_>,
    config: &CorpusConfig,
    token_sink: &mut dyn BatchSink,
    edge_sink: &mut dyn BatchSink,
    progress: &dyn ProgressSink,
) -> Result<usize> {
    if vocab.chemical_names.len() != dims.chemicals {
        return Err(GraphError::invalid(format!(
            "{} chemical names for {} chemical columns",
            vocab.chemical_names.len(),
            dims.chemicals
        )));
    }
    if config.flush_every == 0 {
        return Err(GraphError::invalid("flush_every must be positive"));
    }

    let start = dims.property_keyword();
    let policy = WeightingPolicy::AlphaRatio(config.alpha);
    policy.validate()?;

    let mut increments: Vec<u64> = (0..config.count as u64).collect();
    let mut entropy_rng = match config.seed {
        Some(base) => {
            let mut seeder = StdRng::seed_from_u64(base);
            increments.shuffle(&mut seeder);
            None
        }
        None => Some(StdRng::from_entropy()),
    };

    let mut token_batch = Vec::with_capacity(config.flush_every);
    let mut edge_batch = Vec::with_capacity(config.flush_every);
    let mut stats = RunningStats::default();
    let mut written = 0usize;

    for i in 0..config.count {
        let walk = match (config.seed, entropy_rng.as_mut()) {
            (Some(base), _) => {
                let mut rng = StdRng::seed_from_u64(base.wrapping_add(increments[i]));
                sample_walk(r, dims, start, config.length, false, &policy, &mut rng)?
            }
            (None, Some(rng)) => {
                sample_walk(r, dims, start, config.length, false, &policy, rng)?
            }
            _ => unreachable!(),
        };
        stats.record(walk.nodes.len() as f64);

        let tokens: Vec<String> = walk
            .nodes
            .iter()
            .map(|&n| render_token(dims, vocab, &config.keyword_label, n))
            .collect();
        let edge_ids: Vec<String> = walk
            .edges
            .iter()
            .map(|&e| r.row_id(e).to_string())
            .collect();
        token_batch.push(tokens.join(" "));
        edge_batch.push(edge_ids.join(" "));

        if token_batch.len() == config.flush_every {
            token_sink.write_batch(&token_batch)?;
            edge_sink.write_batch(&edge_batch)?;
            token_sink.flush()?;
            edge_sink.flush()?;
            written += token_batch.len();
            token_batch.clear();
            edge_batch.clear();
            progress.report(&ProgressEvent {
                stage: "corpus",
                processed: written,
                total: config.count,
                stats: Some(stats),
            });
            debug!(written, "corpus batch flushed");
        }
    }

    if !token_batch.is_empty() {
        token_sink.write_batch(&token_batch)?;
        edge_sink.write_batch(&edge_batch)?;
        token_sink.flush()?;
        edge_sink.flush()?;
        written += token_batch.len();
        progress.report(&ProgressEvent {
            stage: "corpus",
            processed: written,
            total: config.count,
            stats: Some(stats),
        });
    }
    Ok(written)
}

/// Which token kind `prune_sentences` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneMode {
    /// Drop author tokens, keep everything else.
    Author,
    /// Drop everything except author tokens and the keyword label.
    Chemical,
    /// Drop all underscored tokens (authors and affiliations).
    AuthorAffiliation,
}

/// Filter rendered sentences for downstream embedding training: removes the
/// selected token kind, truncates each sentence at its first period, and
/// drops sentences left with fewer than two distinct tokens.
pub fn prune_sentences(sentences: &[String], mode: PruneMode, keyword_label: &str) -> Vec<String> {
    sentences
        .iter()
        .filter_map(|sentence| {
            let kept: Vec<&str> = sentence
                .split(' ')
                .filter(|token| match mode {
                    PruneMode::Author => !token.contains("a_"),
                    PruneMode::Chemical => token.contains("a_") || token.contains(keyword_label),
                    PruneMode::AuthorAffiliation => !token.contains('_'),
                })
                .collect();
            if kept.len() < 2 {
                return None;
            }
            let joined = kept.join(" ");
            let truncated = joined.split('.').next().unwrap_or("").to_string();
            let distinct: std::collections::HashSet<&str> =
                truncated.split(' ').filter(|t| !t.is_empty()).collect();
            (distinct.len() > 1).then_some(truncated)
        })
        .collect()
}
