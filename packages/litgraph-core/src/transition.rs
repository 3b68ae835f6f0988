//! Transition-probability engine.
//!
//! Single-step kernel:
//!
//! ```text
//! P = D_V⁻¹ · Rᵗ · D_E⁻¹ · R
//!
//! P[v,u] = (1/d_V[v]) · Σ  (1/d_E[e])
//!                      e∋v,u
//! ```
//!
//! a two-hop node→hyperedge→node random walk: pick an incident hyperedge
//! weighted by inverse hyperedge size, then a node within it weighted by
//! inverse source-node degree. Zero degrees invert to zero, never divide;
//! rows of isolated nodes are all-zero, every other row sums to 1.
//!
//! Multi-step transitions are computed on restricted submatrices only — the
//! product is associated left-to-right so the full `nV×nV` power is never
//! materialized.

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::dimensions::GraphDimensions;
use crate::error::{GraphError, Result};
use crate::matrix::IncidenceMatrix;
use crate::progress::{ProgressEvent, ProgressSink, RunningStats};

/// Row-major sparse matrix of f64 values.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<u32>,
    values: Vec<f64>,
}

/// Small dense block, the terminal form of a multi-step restriction.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseBlock {
    pub n_rows: usize,
    pub n_cols: usize,
    pub data: Vec<f64>,
}

impl DenseBlock {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.n_cols + col]
    }
}

impl CsrMatrix {
    /// Assemble from per-row `(col, value)` lists. Columns within a row must
    /// be unique; they are sorted here.
    pub fn from_rows(n_cols: usize, rows: Vec<Vec<(u32, f64)>>) -> Self {
        let n_rows = rows.len();
        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for mut row in rows {
            row.sort_unstable_by_key(|&(c, _)| c);
            for (c, v) in row {
                col_idx.push(c);
                values.push(v);
            }
            row_ptr.push(col_idx.len());
        }
        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn nnz(&self) -> usize {
        self.col_idx.len()
    }

    /// `(columns, values)` of row `i`.
    pub fn row(&self, i: usize) -> (&[u32], &[f64]) {
        let (lo, hi) = (self.row_ptr[i], self.row_ptr[i + 1]);
        (&self.col_idx[lo..hi], &self.values[lo..hi])
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        let (cols, vals) = self.row(row);
        match cols.binary_search(&(col as u32)) {
            Ok(pos) => vals[pos],
            Err(_) => 0.0,
        }
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.row(i).1.iter().sum()
    }

    /// Reindexed submatrix over the given row and column index sets.
    pub fn restrict(&self, rows: &[usize], cols: &[usize]) -> CsrMatrix {
        let col_pos: FxHashMap<u32, u32> = cols
            .iter()
            .enumerate()
            .map(|(pos, &c)| (c as u32, pos as u32))
            .collect();
        let sub_rows = rows
            .iter()
            .map(|&r| {
                let (row_cols, row_vals) = self.row(r);
                row_cols
                    .iter()
                    .zip(row_vals)
                    .filter_map(|(&c, &v)| col_pos.get(&c).map(|&pos| (pos, v)))
                    .collect()
            })
            .collect();
        CsrMatrix::from_rows(cols.len(), sub_rows)
    }

    /// Sparse × sparse product.
    pub fn matmul(&self, other: &CsrMatrix) -> CsrMatrix {
        assert_eq!(self.n_cols, other.n_rows, "inner dimensions must agree");
        let rows = (0..self.n_rows)
            .map(|i| {
                let mut acc: FxHashMap<u32, f64> = FxHashMap::default();
                let (cols, vals) = self.row(i);
                for (&k, &v) in cols.iter().zip(vals) {
                    let (other_cols, other_vals) = other.row(k as usize);
                    for (&j, &w) in other_cols.iter().zip(other_vals) {
                        *acc.entry(j).or_insert(0.0) += v * w;
                    }
                }
                acc.into_iter().collect()
            })
            .collect();
        CsrMatrix::from_rows(other.n_cols, rows)
    }

    pub fn to_dense(&self) -> DenseBlock {
        let mut data = vec![0.0; self.n_rows * self.n_cols];
        for i in 0..self.n_rows {
            let (cols, vals) = self.row(i);
            for (&c, &v) in cols.iter().zip(vals) {
                data[i * self.n_cols + c as usize] = v;
            }
        }
        DenseBlock {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            data,
        }
    }
}

/// Single-step node-to-node transition probabilities of the hypergraph.
///
/// Rows of nonzero-degree nodes sum to 1 (within floating tolerance); rows of
/// isolated nodes are empty.
pub fn transition_probabilities(r: &IncidenceMatrix) -> CsrMatrix {
    let inv_size: Vec<f64> = (0..r.n_rows())
        .map(|e| {
            let s = r.hyperedge_size(e);
            if s == 0 {
                0.0
            } else {
                1.0 / s as f64
            }
        })
        .collect();

    let rows: Vec<Vec<(u32, f64)>> = (0..r.n_cols())
        .into_par_iter()
        .map(|v| {
            let degree = r.node_degree(v);
            if degree == 0 {
                return Vec::new();
            }
            let inv_degree = 1.0 / degree as f64;
            let mut acc: FxHashMap<u32, f64> = FxHashMap::default();
            for &e in r.col(v) {
                let w = inv_size[e as usize];
                for &u in r.row(e as usize) {
                    *acc.entry(u).or_insert(0.0) += w;
                }
            }
            acc.into_iter()
                .map(|(u, w)| (u, w * inv_degree))
                .collect()
        })
        .collect();

    CsrMatrix::from_rows(r.n_cols(), rows)
}

/// Multi-step transition probabilities from `sources` to `dests` through
/// `intermediaries` (defaulting to the full author block).
///
/// - `nstep == 1`: direct restriction `P[S,D]`.
/// - `nstep == 2`: `P[S,I] · P[I,D]`.
/// - `nstep > 2`: `nstep - 2` further left-to-right multiplications by
///   `P[I,I]` before the final factor.
pub fn multistep(
    p: &CsrMatrix,
    dims: &GraphDimensions,
    sources: &[usize],
    dests: &[usize],
    intermediaries: Option<&[usize]>,
    nstep: usize,
) -> Result<DenseBlock> {
    if nstep < 1 {
        return Err(GraphError::invalid("nstep must be >= 1"));
    }
    if nstep == 1 {
        return Ok(p.restrict(sources, dests).to_dense());
    }

    let author_block: Vec<usize>;
    let inter: &[usize] = match intermediaries {
        Some(set) => set,
        None => {
            author_block = dims.author_range().collect();
            &author_block
        }
    };

    let mut acc = p.restrict(sources, inter);
    if nstep > 2 {
        let core = p.restrict(inter, inter);
        for _ in 0..nstep - 2 {
            acc = acc.matmul(&core);
        }
    }
    Ok(acc.matmul(&p.restrict(inter, dests)).to_dense())
}

/// Symmetrized length-2 transition score from one keyword column to each of
/// `chem_cols`, through shared author nodes:
///
/// ```text
/// score(w2) = ½·(1/d_w1 + 1/d_w2) · Σ (1/d_a) · Σ 1/|e| · Σ 1/|e|
///                                   a          e∋w1,a     e∋w2,a
/// ```
///
/// Chemicals sharing no author with the keyword (or with zero degree) score
/// zero. Emits a progress event with running min/max/mean every 500 chemicals.
pub fn pairwise_transprob_length2(
    r: &IncidenceMatrix,
    dims: &GraphDimensions,
    keyword_col: usize,
    chem_cols: &[usize],
    progress: &dyn ProgressSink,
) -> Vec<f64> {
    let d_w1 = r.node_degree(keyword_col);
    if d_w1 == 0 {
        return vec![0.0; chem_cols.len()];
    }

    // Per shared author a: 1/d_a and Σ_{e ∋ w1,a} 1/|e|, precomputed once.
    let author_range = dims.author_range();
    let mut keyword_side: FxHashMap<u32, f64> = FxHashMap::default();
    for &e in r.col(keyword_col) {
        let inv_size = 1.0 / r.hyperedge_size(e as usize) as f64;
        for &u in r.row(e as usize) {
            if author_range.contains(&(u as usize)) {
                *keyword_side.entry(u).or_insert(0.0) += inv_size;
            }
        }
    }

    let mut stats = RunningStats::default();
    let mut scores = vec![0.0; chem_cols.len()];
    for (i, &c) in chem_cols.iter().enumerate() {
        let d_w2 = r.node_degree(c);
        if d_w2 > 0 {
            let mut chem_side: FxHashMap<u32, f64> = FxHashMap::default();
            for &e in r.col(c) {
                let inv_size = 1.0 / r.hyperedge_size(e as usize) as f64;
                for &u in r.row(e as usize) {
                    if author_range.contains(&(u as usize)) && keyword_side.contains_key(&u) {
                        *chem_side.entry(u).or_insert(0.0) += inv_size;
                    }
                }
            }
            let through: f64 = chem_side
                .iter()
                .map(|(a, w2_sum)| {
                    let d_a = r.node_degree(*a as usize) as f64;
                    (1.0 / d_a) * keyword_side[a] * w2_sum
                })
                .sum();
            scores[i] = 0.5 * (1.0 / d_w1 as f64 + 1.0 / d_w2 as f64) * through;
        }
        stats.record(scores[i]);

        if (i + 1) % 500 == 0 {
            progress.report(&ProgressEvent {
                stage: "transprob-len2",
                processed: i + 1,
                total: chem_cols.len(),
                stats: Some(stats),
            });
        }
    }
    scores
}
