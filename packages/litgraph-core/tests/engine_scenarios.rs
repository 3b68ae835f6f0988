//! End-to-end scenarios over a small hand-built literature hypergraph.

use pretty_assertions::assert_eq;

use litgraph_core::{
    bfs, generate_corpus, multistep, restrict_to_years, sample_walk, transition_probabilities,
    year_discoveries, CorpusConfig, GraphDimensions, GraphError, IncidenceMatrix, MemorySink,
    NodeVocabulary, NoopSink, WeightingPolicy,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Columns [a1, a2, c1, c2, kw].
/// P0 = {a1, c1}, P1 = {a1, c2}, P2 = {a2, c1, kw}.
fn scenario() -> (IncidenceMatrix, GraphDimensions) {
    let r = IncidenceMatrix::from_rows(vec![vec![0, 2], vec![0, 3], vec![1, 2, 4]], 5);
    (r, GraphDimensions::new(2, 2, 0, 1))
}

#[test]
fn degrees_match_the_paper_set() {
    let (r, _) = scenario();
    assert_eq!(r.node_degree(0), 2); // a1
    assert_eq!(r.node_degree(1), 1); // a2
    assert_eq!(r.node_degree(2), 2); // c1
    assert_eq!(r.node_degree(3), 1); // c2
    assert_eq!(r.node_degree(4), 1); // keyword
    assert_eq!(r.hyperedge_size(2), 3);
}

#[test]
fn transition_rows_are_stochastic() {
    let (r, _) = scenario();
    let p = transition_probabilities(&r);
    for v in 0..r.n_cols() {
        assert!((p.row_sum(v) - 1.0).abs() < 1e-9, "row {v}");
    }
}

#[test]
fn multistep_chains_through_authors() {
    let (r, dims) = scenario();
    let p = transition_probabilities(&r);

    // one step kw → chemicals is the plain restriction
    let one = multistep(&p, &dims, &[4], &[2, 3], None, 1).unwrap();
    assert_eq!(one.get(0, 0), p.get(4, 2));
    assert_eq!(one.get(0, 1), p.get(4, 3));

    // two steps kw → author → chemicals
    let two = multistep(&p, &dims, &[4], &[2, 3], None, 2).unwrap();
    let expected_c1: f64 = (0..2).map(|a| p.get(4, a) * p.get(a, 2)).sum();
    let expected_c2: f64 = (0..2).map(|a| p.get(4, a) * p.get(a, 3)).sum();
    assert!((two.get(0, 0) - expected_c1).abs() < 1e-12);
    assert!((two.get(0, 1) - expected_c2).abs() < 1e-12);

    // three steps kw → a2 → a2 → c1, all factors known
    let three = multistep(&p, &dims, &[4], &[2], None, 3).unwrap();
    let expected: f64 = (0..2)
        .flat_map(|a| (0..2).map(move |b| (a, b)))
        .map(|(a, b)| p.get(4, a) * p.get(a, b) * p.get(b, 2))
        .sum();
    assert!((three.get(0, 0) - expected).abs() < 1e-12);
    assert!(three.get(0, 0) > 0.0);
}

#[test]
fn bfs_walks_the_whole_component() {
    let (r, _) = scenario();
    let d = bfs(&r, 0, &[]);
    assert_eq!(d.len(), 5);
    assert_eq!(d[&0], 0);
    assert_eq!(d[&2], 1); // shares P0
    assert_eq!(d[&3], 1); // shares P1
    assert_eq!(d[&1], 2); // via c1
    assert_eq!(d[&4], 2); // via c1
}

#[test]
fn bfs_stops_at_the_keyword() {
    let (r, _) = scenario();
    let d = bfs(&r, 0, &[4]);
    assert_eq!(d.len(), 1);
    assert_eq!(d[&4], 2);
}

#[test]
fn isolated_start_fails_fast() {
    // extra keyword column 5 that no paper carries
    let dims = GraphDimensions::new(2, 2, 0, 2);
    let r = IncidenceMatrix::from_rows(vec![vec![0, 2], vec![0, 3], vec![1, 2, 4]], 6);
    let mut rng = StdRng::seed_from_u64(1);
    let err = sample_walk(&r, &dims, 5, 4, false, &WeightingPolicy::Plain, &mut rng).unwrap_err();
    assert!(matches!(err, GraphError::IsolatedStart(5)));
}

#[test]
fn walks_never_exceed_requested_length() {
    let (r, dims) = scenario();
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let walk = sample_walk(
            &r,
            &dims,
            4,
            5,
            false,
            &WeightingPolicy::AlphaRatio(1.0),
            &mut rng,
        )
        .unwrap();
        assert!(walk.nodes.len() <= 5);
        assert_eq!(walk.edges.len(), walk.nodes.len() - 1);
        // no zero-weight transition: consecutive nodes differ and share an edge
        for (i, &e) in walk.edges.iter().enumerate() {
            assert_ne!(walk.nodes[i], walk.nodes[i + 1]);
            assert!(r.contains(e, walk.nodes[i]));
            assert!(r.contains(e, walk.nodes[i + 1]));
        }
    }
}

#[test]
fn corpus_is_reproducible_for_a_fixed_seed() {
    let (r, dims) = scenario();
    let names = vec!["LiFePO4".to_string(), "Bi2Te3".to_string()];
    let vocab = NodeVocabulary {
        chemical_names: &names,
    };
    let config = CorpusConfig {
        count: 40,
        length: 8,
        alpha: 1.0,
        keyword_label: "thermoelectric".into(),
        seed: Some(2024),
        flush_every: 16,
    };

    let run = || {
        let mut tokens = MemorySink::default();
        let mut edges = MemorySink::default();
        generate_corpus(&r, &dims, &vocab, &config, &mut tokens, &mut edges, &NoopSink).unwrap();
        (tokens.lines, edges.lines)
    };
    let (mut t1, e1) = run();
    let (mut t2, e2) = run();
    t1.sort();
    t2.sort();
    assert_eq!(t1, t2);
    assert_eq!(e1.len(), e2.len());
}

#[test]
fn year_discovery_scenario() {
    let (r, dims) = scenario();
    let years = [2001, 2001, 2002];

    let found = year_discoveries(&r, &dims, &years, 2002).unwrap();
    assert_eq!(found.entities, vec![2]); // c1, via P2 only
    assert_eq!(found.papers[&2], vec![2]);

    // c2 never co-occurs with the keyword: no year reports it
    for year in [2001, 2002, 2003] {
        let found = year_discoveries(&r, &dims, &years, year).unwrap();
        assert!(!found.entities.contains(&3));
    }

    // recomputing P on a year slice: fresh matrix, original untouched
    let sub = restrict_to_years(&r, &years, &[2001]).unwrap();
    let p_sub = transition_probabilities(&sub);
    assert_eq!(p_sub.row_sum(4), 0.0); // keyword isolated in 2001
    assert_eq!(r.node_degree(4), 1);
}
