//! Property tests for the transition-probability kernel.

use litgraph_core::{transition_probabilities, IncidenceMatrix};
use proptest::prelude::*;

/// Arbitrary small incidence matrices: up to 12 hyperedges over up to 10
/// columns, each row an arbitrary (possibly empty) column subset.
fn arb_incidence() -> impl Strategy<Value = IncidenceMatrix> {
    (2usize..=10).prop_flat_map(|n_cols| {
        prop::collection::vec(
            prop::collection::vec(0u32..n_cols as u32, 0..=n_cols),
            1..=12,
        )
        .prop_map(move |rows| IncidenceMatrix::from_rows(rows, n_cols))
    })
}

proptest! {
    #[test]
    fn rows_sum_to_one_or_zero(r in arb_incidence()) {
        let p = transition_probabilities(&r);
        for v in 0..r.n_cols() {
            let sum = p.row_sum(v);
            if r.node_degree(v) == 0 {
                prop_assert_eq!(sum, 0.0);
            } else {
                prop_assert!((sum - 1.0).abs() < 1e-9,
                    "node {} (degree {}) row sums to {}", v, r.node_degree(v), sum);
            }
        }
    }

    #[test]
    fn probabilities_are_nonnegative(r in arb_incidence()) {
        let p = transition_probabilities(&r);
        for v in 0..r.n_cols() {
            let (_, vals) = p.row(v);
            for &w in vals {
                prop_assert!(w >= 0.0);
            }
        }
    }

    #[test]
    fn support_matches_shared_hyperedges(r in arb_incidence()) {
        // P[v,u] > 0 iff v and u share at least one hyperedge.
        let p = transition_probabilities(&r);
        for v in 0..r.n_cols() {
            for u in 0..r.n_cols() {
                let shares = r.col(v).iter().any(|&e| r.contains(e as usize, u));
                prop_assert_eq!(p.get(v, u) > 0.0, shares, "v={} u={}", v, u);
            }
        }
    }
}
