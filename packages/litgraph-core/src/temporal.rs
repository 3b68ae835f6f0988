//! Year-based restriction and first-co-occurrence discovery extraction.
//!
//! A chemical entity is "discovered" in a year when it co-occurs with the
//! keyword signal (any keyword column set in the row) for the first time:
//! never in any earlier-dated hyperedge, and in at least one hyperedge dated
//! exactly that year. The contributing current-year paper ids are reported
//! per entity for downstream provenance and author attribution.

use rustc_hash::FxHashSet;
use std::collections::HashMap;

use crate::dimensions::GraphDimensions;
use crate::error::{GraphError, Result};
use crate::matrix::IncidenceMatrix;

/// Row-select the hyperedges whose year is in `years`. Zero-degree columns
/// are not pruned; row ids carry through for provenance.
pub fn restrict_to_years(
    r: &IncidenceMatrix,
    year_of_row: &[i32],
    years: &[i32],
) -> Result<IncidenceMatrix> {
    if year_of_row.len() != r.n_rows() {
        return Err(GraphError::invalid(format!(
            "{} year annotations for {} rows",
            year_of_row.len(),
            r.n_rows()
        )));
    }
    let wanted: FxHashSet<i32> = years.iter().copied().collect();
    let keep: Vec<usize> = (0..r.n_rows())
        .filter(|&i| wanted.contains(&year_of_row[i]))
        .collect();
    Ok(r.select_rows(&keep))
}

/// Newly co-occurring chemical entities of one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearDiscoveries {
    /// Global chemical columns first co-occurring with the keyword signal
    /// this year, sorted.
    pub entities: Vec<usize>,
    /// Per entity: the current-year paper ids whose hyperedges contributed
    /// the co-occurrence, sorted.
    pub papers: HashMap<usize, Vec<u32>>,
}

/// Chemical-block entities whose first keyword co-occurrence is dated exactly
/// `year`, with the contributing paper ids.
pub fn year_discoveries(
    r: &IncidenceMatrix,
    dims: &GraphDimensions,
    year_of_row: &[i32],
    year: i32,
) -> Result<YearDiscoveries> {
    if year_of_row.len() != r.n_rows() {
        return Err(GraphError::invalid(format!(
            "{} year annotations for {} rows",
            year_of_row.len(),
            r.n_rows()
        )));
    }

    // Rows carrying the keyword signal: any keyword column set.
    let mut keyword_rows: FxHashSet<u32> = FxHashSet::default();
    for k in dims.keyword_range() {
        keyword_rows.extend(r.col(k).iter().copied());
    }

    let chem_range = dims.chemical_range();
    let mut prior: FxHashSet<usize> = FxHashSet::default();
    for &e in &keyword_rows {
        if year_of_row[e as usize] < year {
            for &c in r.row(e as usize) {
                let c = c as usize;
                if chem_range.contains(&c) {
                    prior.insert(c);
                }
            }
        }
    }

    let mut papers: HashMap<usize, Vec<u32>> = HashMap::new();
    for &e in &keyword_rows {
        if year_of_row[e as usize] == year {
            for &c in r.row(e as usize) {
                let c = c as usize;
                if chem_range.contains(&c) && !prior.contains(&c) {
                    papers.entry(c).or_default().push(r.row_id(e as usize));
                }
            }
        }
    }
    for ids in papers.values_mut() {
        ids.sort_unstable();
        ids.dedup();
    }

    let mut entities: Vec<usize> = papers.keys().copied().collect();
    entities.sort_unstable();
    Ok(YearDiscoveries { entities, papers })
}
