//! Neighborhoods and breadth-first traversal over the node-adjacency graph
//! induced by shared hyperedges.
//!
//! Adjacency is never materialized as an edge list: two nodes are adjacent
//! iff some hyperedge contains both, and the traversal walks the incidence
//! lists directly (column → incident hyperedges → their rows).

use rustc_hash::FxHashSet;
use std::collections::{HashMap, VecDeque};

use crate::matrix::IncidenceMatrix;
use crate::progress::{NoopSink, ProgressEvent, ProgressSink};

/// Nodes co-occurring with `node` in at least one hyperedge, as a sorted,
/// deduplicated list. Includes `node` itself whenever it appears in any
/// hyperedge (self co-occurrence is not filtered).
pub fn neighbors(r: &IncidenceMatrix, node: usize) -> Vec<usize> {
    let mut out: Vec<usize> = r
        .col(node)
        .iter()
        .flat_map(|&e| r.row(e as usize).iter().map(|&u| u as usize))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Breadth-first distances from `start` in the induced node-adjacency graph.
///
/// With empty `stopping_points`, returns the hop distance to every node in
/// `start`'s connected component (`distance[start] == 0`). With stopping
/// points, each stopping node reached is recorded at its discovery distance
/// but its neighbors are never expanded, and the returned map contains only
/// the stopping nodes reached.
///
/// Known limitation, kept for compatibility: because stopping nodes are not
/// expanded, a target whose only paths run through another stopping node is
/// never reached.
pub fn bfs(
    r: &IncidenceMatrix,
    start: usize,
    stopping_points: &[usize],
) -> HashMap<usize, usize> {
    bfs_with_progress(r, start, stopping_points, &NoopSink)
}

/// `bfs` with a progress event every 100 finalized distances.
pub fn bfs_with_progress(
    r: &IncidenceMatrix,
    start: usize,
    stopping_points: &[usize],
    progress: &dyn ProgressSink,
) -> HashMap<usize, usize> {
    let stops: FxHashSet<usize> = stopping_points.iter().copied().collect();
    let mut visited: FxHashSet<usize> = FxHashSet::default();
    let mut distances = HashMap::new();
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut finalized = 0usize;

    visited.insert(start);
    queue.push_back((start, 0));

    while let Some((node, dist)) = queue.pop_front() {
        let is_stop = stops.contains(&node);
        if stops.is_empty() || is_stop {
            distances.insert(node, dist);
        }
        finalized += 1;
        if finalized % 100 == 0 {
            progress.report(&ProgressEvent {
                stage: "bfs",
                processed: finalized,
                total: 0,
                stats: None,
            });
        }

        if is_stop {
            continue; // recorded, never expanded
        }
        for &e in r.col(node) {
            for &u in r.row(e as usize) {
                let u = u as usize;
                if visited.insert(u) {
                    queue.push_back((u, dist + 1));
                }
            }
        }
    }
    distances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::RecordingSink;

    /// Path-shaped hypergraph: columns 0-1-2-3-4 chained by two-node edges.
    fn path() -> IncidenceMatrix {
        IncidenceMatrix::from_rows(
            vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 4]],
            5,
        )
    }

    #[test]
    fn test_neighbors() {
        let r = path();
        assert_eq!(neighbors(&r, 2), vec![1, 2, 3]);
        assert_eq!(neighbors(&r, 0), vec![0, 1]);
    }

    #[test]
    fn test_neighbors_isolated() {
        let r = IncidenceMatrix::from_rows(vec![vec![0, 1]], 3);
        assert!(neighbors(&r, 2).is_empty());
    }

    #[test]
    fn test_bfs_full_component() {
        let r = path();
        let d = bfs(&r, 0, &[]);
        assert_eq!(d.len(), 5);
        for (node, expected) in [(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)] {
            assert_eq!(d[&node], expected);
        }
    }

    #[test]
    fn test_bfs_unreachable_excluded() {
        // 0-1 edge plus isolated column 2
        let r = IncidenceMatrix::from_rows(vec![vec![0, 1]], 3);
        let d = bfs(&r, 0, &[]);
        assert_eq!(d.len(), 2);
        assert!(!d.contains_key(&2));
    }

    #[test]
    fn test_bfs_stopping_point_restricts_result() {
        let r = path();
        let d = bfs(&r, 0, &[3]);
        assert_eq!(d.len(), 1);
        assert_eq!(d[&3], 3);
    }

    #[test]
    fn test_bfs_stopping_point_blocks_expansion() {
        // 4 is only reachable through 3; stopping at 3 hides 4.
        let r = path();
        let d = bfs(&r, 0, &[3, 4]);
        assert_eq!(d.len(), 1);
        assert_eq!(d[&3], 3);
    }

    #[test]
    fn test_bfs_progress_events() {
        // 0 joined to 150 other nodes by one big hyperedge
        let edge: Vec<u32> = (0..151).collect();
        let r = IncidenceMatrix::from_rows(vec![edge], 151);
        let sink = RecordingSink::new();
        let d = bfs_with_progress(&r, 0, &[], &sink);
        assert_eq!(d.len(), 151);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].processed, 100);
    }
}
