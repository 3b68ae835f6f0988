//! Node-type block layout of the hypergraph columns.
//!
//! Columns of the incidence matrix are laid out as four contiguous,
//! non-overlapping blocks that together cover every column:
//!
//! ```text
//! [ authors | chemicals | affiliations | keywords ]
//!   0 .. nA   nA .. nA+nC  ..             .. total
//! ```
//!
//! The affiliation block may be empty. The last keyword column is, by
//! convention, the target property keyword that corpus walks start from.
//!
//! `GraphDimensions` is computed once at startup (from store counts) and
//! threaded explicitly through every component; nothing in this crate caches
//! entity counts at module level.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Node type of a hypergraph column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeClass {
    Author,
    Chemical,
    Affiliation,
    Keyword,
}

/// Column-block sizes of the hypergraph, one per node class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDimensions {
    pub authors: usize,
    pub chemicals: usize,
    pub affiliations: usize,
    pub keywords: usize,
}

impl GraphDimensions {
    pub fn new(authors: usize, chemicals: usize, affiliations: usize, keywords: usize) -> Self {
        Self {
            authors,
            chemicals,
            affiliations,
            keywords,
        }
    }

    /// Total number of columns across all blocks.
    pub fn total_nodes(&self) -> usize {
        self.authors + self.chemicals + self.affiliations + self.keywords
    }

    pub fn author_range(&self) -> Range<usize> {
        0..self.authors
    }

    pub fn chemical_range(&self) -> Range<usize> {
        self.authors..self.authors + self.chemicals
    }

    pub fn affiliation_range(&self) -> Range<usize> {
        let start = self.authors + self.chemicals;
        start..start + self.affiliations
    }

    pub fn keyword_range(&self) -> Range<usize> {
        let start = self.authors + self.chemicals + self.affiliations;
        start..start + self.keywords
    }

    pub fn range_of(&self, class: NodeClass) -> Range<usize> {
        match class {
            NodeClass::Author => self.author_range(),
            NodeClass::Chemical => self.chemical_range(),
            NodeClass::Affiliation => self.affiliation_range(),
            NodeClass::Keyword => self.keyword_range(),
        }
    }

    /// Node class of a global column index.
    pub fn class_of(&self, col: usize) -> Option<NodeClass> {
        self.split(col).map(|(class, _)| class)
    }

    /// Global column index → (class, index within the class block).
    pub fn split(&self, col: usize) -> Option<(NodeClass, usize)> {
        for class in [
            NodeClass::Author,
            NodeClass::Chemical,
            NodeClass::Affiliation,
            NodeClass::Keyword,
        ] {
            let range = self.range_of(class);
            if range.contains(&col) {
                return Some((class, col - range.start));
            }
        }
        None
    }

    /// (class, local index) → global column index.
    pub fn global_index(&self, class: NodeClass, local: usize) -> usize {
        self.range_of(class).start + local
    }

    /// Column of the target property keyword (the last column).
    pub fn property_keyword(&self) -> usize {
        self.total_nodes() - 1
    }
}
