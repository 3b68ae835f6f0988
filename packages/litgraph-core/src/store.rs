//! `KnowledgeStore` port: read-only access to the relational literature store.
//!
//! The engine never talks to a database directly; it consumes this trait. All
//! queries are read-only and may fail with `GraphError::StoreUnavailable`,
//! which callers propagate (no retry policy is assumed at this layer).

use std::ops::Range;

use crate::error::Result;

/// Entity kinds the store can be queried about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Paper,
    Author,
    Chemical,
    Affiliation,
}

/// Membership of one paper in one entity class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperMembership {
    pub paper_id: u32,
    /// Local (per-class) entity ids. May be empty.
    pub member_ids: Vec<u32>,
}

/// A paper matched by a keyword query, with its author ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    pub paper_id: u32,
    pub author_ids: Vec<u32>,
}

/// Read-only queries against the paper/author/chemical/affiliation store.
pub trait KnowledgeStore {
    /// Number of entities of the given class.
    fn count(&self, class: EntityClass) -> Result<usize>;

    /// Per-paper memberships of one class for a contiguous paper-id range.
    /// Papers with no members of the class may be omitted entirely.
    fn memberships(&self, class: EntityClass, papers: Range<u32>) -> Result<Vec<PaperMembership>>;

    /// Papers whose keyword annotations match any of `keywords` (OR
    /// combination), optionally restricted to the given years. Keywords
    /// listed in `case_sensitive` are matched exactly; the rest
    /// case-insensitively.
    fn papers_by_keyword_set(
        &self,
        keywords: &[String],
        years: Option<&[i32]>,
        case_sensitive: &[String],
    ) -> Result<Vec<KeywordHit>>;

    /// Publication year of one paper.
    fn paper_year(&self, paper_id: u32) -> Result<i32>;
}
