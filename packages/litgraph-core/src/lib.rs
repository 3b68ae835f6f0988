//! litgraph-core — literature hypergraph random-walk engine.
//!
//! Papers are hyperedges over four contiguous node blocks (authors,
//! chemicals, affiliations, keywords). This crate builds the sparse boolean
//! incidence matrix from a read-only knowledge store, derives row-stochastic
//! transition-probability matrices, runs breadth-first traversal over the
//! induced node-adjacency graph, samples weighted random walks with pluggable
//! node-weighting policies, and extracts first-co-occurrence discoveries per
//! year.
//!
//! ## Layout
//!
//! - `dimensions` : column-block layout (`GraphDimensions`, `NodeClass`)
//! - `matrix`     : boolean incidence matrix + CSC snapshots
//! - `store`      : `KnowledgeStore` port (SQLite adapter in litgraph-storage)
//! - `builder`    : batched, resumable, cancellable matrix construction
//! - `transition` : `P = D_V⁻¹·Rᵗ·D_E⁻¹·R` and multi-step restrictions
//! - `traversal`  : co-occurrence neighborhoods and stopping-point BFS
//! - `walk`       : weighted walks, weighting policies, corpus generation
//! - `temporal`   : year restriction and yearly discovery extraction
//! - `progress`   : injected progress events (tracing / no-op / recording)
//!
//! ## Invariants
//!
//! - The incidence matrix is read-shared: every restriction returns a new
//!   matrix, nothing mutates it in place.
//! - Zero degrees invert to zero; degree normalization never divides by zero.
//! - Every sampling entry point takes an explicit RNG handle or seed.

pub mod builder;
pub mod dimensions;
pub mod error;
pub mod matrix;
pub mod progress;
pub mod store;
pub mod temporal;
pub mod transition;
pub mod traversal;
pub mod walk;

pub use builder::{BuilderConfig, IncidenceMatrixBuilder};
pub use dimensions::{GraphDimensions, NodeClass};
pub use error::{GraphError, Result};
pub use matrix::IncidenceMatrix;
pub use progress::{NoopSink, ProgressEvent, ProgressSink, RecordingSink, RunningStats, TracingSink};
pub use store::{EntityClass, KeywordHit, KnowledgeStore, PaperMembership};
pub use temporal::{restrict_to_years, year_discoveries, YearDiscoveries};
pub use transition::{
    multistep, pairwise_transprob_length2, transition_probabilities, CsrMatrix, DenseBlock,
};
pub use traversal::{bfs, bfs_with_progress, neighbors};
pub use walk::{
    generate_corpus, prune_sentences, sample_walk, BatchSink, CorpusConfig, FileSink, MemorySink,
    NodeVocabulary, PruneMode, Walk, WeightingPolicy,
};
