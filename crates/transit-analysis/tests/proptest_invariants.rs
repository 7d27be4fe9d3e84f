use std::collections::HashSet;

use proptest::prelude::*;
use transit_analysis::flow::{solve, FlowOptions, FlowTarget};
use transit_analysis::metrics::ranking::{rank, Centrality, RankingOptions};
use transit_analysis::robustness::{removal_order, simulate, AttackOptions, AttackStrategy};
use transit_analysis::TransitGraph;
use transit_core::config::DuplicateEdgePolicy;
use transit_core::table::EdgeRow;
use transit_core::{Station, StationKey};

fn key(i: usize) -> StationKey {
    StationKey::new(format!("S{i}"), "L")
}

/// A graph on `n` stations with arbitrary edges (self-loops included, which
/// the loader drops) and a few stations no edge touches.
fn arb_graph() -> impl Strategy<Value = TransitGraph> {
    (1usize..12).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n, 1u32..100), 0..(n * 2)).prop_map(move |edges| {
            let stations = (0..n).map(|i| Station::bare(key(i))).collect();
            let rows: Vec<EdgeRow> = edges
                .into_iter()
                .map(|(a, b, w)| EdgeRow {
                    from: key(a),
                    to: key(b),
                    weight: f64::from(w),
                })
                .collect();
            TransitGraph::load(stations, &rows, DuplicateEdgePolicy::Sum).expect("load")
        })
    })
}

fn arb_centrality() -> impl Strategy<Value = Centrality> {
    prop_oneof![
        Just(Centrality::Degree),
        Just(Centrality::Betweenness),
        Just(Centrality::Closeness),
    ]
}

/// Feasible targets: unit floor plus the degree sums of random
/// non-negative pair excesses.
fn arb_targets() -> impl Strategy<Value = Vec<f64>> {
    (2usize..7).prop_flat_map(|n| {
        let pairs = n * (n - 1) / 2;
        prop::collection::vec(0u32..20, pairs).prop_map(move |extra| {
            let mut targets = vec![(n - 1) as f64; n];
            let mut p = 0;
            for i in 0..n {
                for j in i + 1..n {
                    let e = f64::from(extra[p]);
                    targets[i] += e;
                    targets[j] += e;
                    p += 1;
                }
            }
            targets
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn rankings_descend_with_first_seen_ties(g in arb_graph(), centrality in arb_centrality()) {
        let ranking = rank(&g, centrality, RankingOptions::default());
        prop_assert_eq!(ranking.len(), g.node_count());

        let position = |k: &StationKey| g.node_index(k).map(|i| i.index());
        for pair in ranking.entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.score + 2e-9 >= b.score);
            if a.score.to_bits() == b.score.to_bits() {
                prop_assert!(position(&a.key) < position(&b.key));
            }
        }
    }

    #[test]
    fn removal_orders_are_permutations(g in arb_graph(), seed in any::<u64>()) {
        for strategy in AttackStrategy::ALL {
            let order = removal_order(&g, strategy, RankingOptions::default(), seed);
            prop_assert_eq!(order.len(), g.node_count());
            let unique: HashSet<&StationKey> = order.iter().collect();
            prop_assert_eq!(unique.len(), order.len());
            prop_assert!(order.iter().all(|k| g.node_index(k).is_some()));
        }
    }

    #[test]
    fn first_sample_matches_intact_graph(g in arb_graph(), fraction in 0.05f64..1.5) {
        let options = AttackOptions { fraction, seed: Some(1), ..AttackOptions::default() };
        let run = simulate(&g, AttackStrategy::Random, &options).expect("run");
        let n = g.node_count() as f64;
        let first = &run.samples[0];
        prop_assert!(first.largest_component_fraction > 0.0);
        prop_assert!(first.largest_component_fraction <= 1.0);
        prop_assert!((first.largest_component_fraction - g.largest_component().len() as f64 / n).abs() < 1e-12);

        for pair in run.samples.windows(2) {
            prop_assert!(pair[1].largest_component_fraction <= pair[0].largest_component_fraction);
            prop_assert!(pair[1].fraction_removed > pair[0].fraction_removed);
        }
        if let Some(step) = run.degenerate_from {
            prop_assert!(run.samples[step..].iter().all(|s| s.efficiency.is_none()));
        }
    }

    #[test]
    fn solved_flows_meet_targets(values in arb_targets()) {
        let targets: Vec<FlowTarget> = values
            .iter()
            .enumerate()
            .map(|(i, &t)| FlowTarget::new(key(i), t))
            .collect();
        let solution = solve(&targets, &FlowOptions::default()).expect("feasible by construction");

        let scale = values.iter().copied().fold(1.0_f64, f64::max);
        for (i, &t) in values.iter().enumerate() {
            prop_assert!((solution.inflow(i) - t).abs() <= 1e-6 * scale);
        }
        for (from, to, f) in solution.rows() {
            prop_assert!(f >= 1.0 - 1e-12);
            prop_assert_eq!(solution.flow(to, from), Some(f));
        }
    }
}
