//! Known-topology regression tests for the attack simulator, the impact
//! assessor and the flow solver.
//!
//! Expected values are worked out by hand for each small network.

use transit_analysis::flow::{solve, FlowOptions, FlowTarget};
use transit_analysis::metrics::ranking::{rank_by_betweenness, rank_by_degree};
use transit_analysis::robustness::{
    assess_impact, simulate, simulate_all, AttackOptions, AttackStrategy, Metric,
};
use transit_analysis::{GraphSummary, TransitGraph};
use transit_core::config::DuplicateEdgePolicy;
use transit_core::table::{read_edges, read_nodes, EdgeRow};
use transit_core::{AnalysisError, Station, StationKey};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn key(name: &str) -> StationKey {
    StationKey::new(name, "1")
}

fn build(nodes: &[&str], edges: &[(&str, &str, f64)]) -> TransitGraph {
    let stations = nodes.iter().map(|n| Station::bare(key(n))).collect();
    let rows: Vec<EdgeRow> = edges
        .iter()
        .map(|(a, b, w)| EdgeRow {
            from: key(a),
            to: key(b),
            weight: *w,
        })
        .collect();
    TransitGraph::load(stations, &rows, DuplicateEdgePolicy::LastWins).expect("load")
}

fn seeded(fraction: f64) -> AttackOptions {
    AttackOptions {
        fraction,
        seed: Some(2024),
        ..AttackOptions::default()
    }
}

// ---------------------------------------------------------------------------
// Attack scenarios
// ---------------------------------------------------------------------------

#[test]
fn removing_the_hub_of_a_short_line() {
    // A -10- B -5- C: B is the busiest station and the only transfer.
    let g = build(&[], &[("A", "B", 10.0), ("B", "C", 5.0)]);
    let run = simulate(&g, AttackStrategy::Degree, &seeded(0.34)).expect("run");

    assert_eq!(run.order, vec![key("B")]);
    let after = &run.samples[1];
    assert!((after.largest_component_fraction - 1.0 / 3.0).abs() < 1e-12);
    assert!(after.efficiency.is_none());

    let efficiency = assess_impact(&g, &[key("B")]).expect("impact").efficiency;
    assert!(efficiency.value < efficiency.initial);
}

#[test]
fn ring_degree_attack_drains_one_station_at_a_time() {
    let g = build(
        &[],
        &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0), ("D", "A", 1.0)],
    );
    let run = simulate(&g, AttackStrategy::Degree, &seeded(0.99)).expect("run");
    let series: Vec<f64> = run
        .series(Metric::LargestComponentFraction)
        .into_iter()
        .filter_map(|(_, v)| v)
        .collect();
    assert_eq!(series, vec![1.0, 0.75, 0.5, 0.25]);

    let removed: Vec<f64> = run.series(Metric::Efficiency).into_iter().map(|(x, _)| x).collect();
    assert_eq!(removed, vec![0.0, 0.25, 0.5, 0.75]);
}

#[test]
fn all_but_one_removed_leaves_a_single_station() {
    let g = build(
        &[],
        &[
            ("A", "B", 1.0),
            ("B", "C", 1.0),
            ("C", "D", 1.0),
            ("D", "E", 1.0),
            ("E", "A", 1.0),
            ("A", "C", 1.0),
        ],
    );
    let n = g.node_count();
    let mut working = g.clone();
    for name in ["A", "B", "C", "D"] {
        working.remove_node(&key(name)).expect("remove");
    }
    let largest = working.largest_component();
    assert!((largest.len() as f64 / n as f64 - 1.0 / n as f64).abs() < f64::EPSILON);
    assert!(working.average_shortest_path_length(&largest).expect("apl").abs() < f64::EPSILON);

    let run = simulate(&g, AttackStrategy::Betweenness, &seeded(0.8)).expect("run");
    let last = run.last().expect("samples");
    assert!((last.largest_component_fraction - 0.2).abs() < 1e-12);
    assert!(last.average_path_length.is_none());
}

#[test]
fn complete_graph_is_fully_efficient() {
    let names = ["A", "B", "C", "D", "E"];
    let mut edges = Vec::new();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            edges.push((*a, *b, 1.0));
        }
    }
    let g = build(&[], &edges);
    assert!((g.global_efficiency() - 1.0).abs() < 1e-12);

    let run = simulate(&g, AttackStrategy::Random, &seeded(0.6)).expect("run");
    // Any subset of a complete graph stays complete.
    for sample in &run.samples {
        assert!((sample.efficiency.expect("efficiency") - 1.0).abs() < 1e-12);
        assert!((sample.average_path_length.expect("apl") - 1.0).abs() < 1e-12);
    }
}

#[test]
fn targeted_attacks_hurt_a_star_more_than_chance() {
    // Hub H with six spokes: the targeted strategies all take H first.
    let spokes = ["A", "B", "C", "D", "E", "F"];
    let edges: Vec<(&str, &str, f64)> = spokes.iter().map(|s| ("H", *s, 1.0)).collect();
    let g = build(&[], &edges);

    let runs = simulate_all(&g, &seeded(0.2)).expect("runs");
    assert_eq!(runs.len(), 4);
    for run in runs.iter().filter(|r| r.strategy != AttackStrategy::Random) {
        assert_eq!(run.order[0], key("H"), "{} attack", run.strategy);
        assert!((run.samples[1].largest_component_fraction - 1.0 / 7.0).abs() < 1e-12);
        assert_eq!(run.degenerate_from, Some(1));
    }
}

#[test]
fn fragmented_network_still_reports_component_fraction() {
    let g = build(&["Z"], &[("A", "B", 1.0), ("B", "C", 1.0)]);
    let run = simulate(&g, AttackStrategy::Closeness, &seeded(1.0)).expect("run");
    assert_eq!(run.samples.len(), 5);
    assert!((run.samples[0].largest_component_fraction - 0.75).abs() < 1e-12);
    // Global efficiency counts the isolated station's pairs as zero.
    let eff = run.samples[0].efficiency.expect("efficiency");
    assert!((eff - 5.0 / 12.0).abs() < 1e-12, "got {eff}");
}

// ---------------------------------------------------------------------------
// Rankings on literal-keyed tables
// ---------------------------------------------------------------------------

#[test]
fn rankings_from_csv_tables() {
    let nodes = "\
,Nearest_Stop,location,borough,routes
0,\"('Times Sq', '1')\",\"(40.75, -73.98)\",Manhattan,\"['1', '2', '3']\"
1,\"('Penn', '1')\",\"(40.75, -73.99)\",Manhattan,1 2 3
";
    let edges = "\
from,to,total_ridership
\"('Penn', '1')\",\"('Times Sq', '1')\",120
\"('Times Sq', '1')\",\"('Chambers', '1')\",80
\"('Times Sq', '1')\",\"('Houston', '1')\",40
";
    let stations = read_nodes(nodes.as_bytes()).expect("nodes");
    let rows = read_edges(edges.as_bytes(), None).expect("edges");
    let g = TransitGraph::load(stations, &rows, DuplicateEdgePolicy::LastWins).expect("graph");

    let times_sq = StationKey::new("Times Sq", "1");
    let by_degree = rank_by_degree(&g, true);
    assert_eq!(by_degree.entries[0].key, times_sq);
    assert!((by_degree.entries[0].score - 240.0).abs() < f64::EPSILON);
    assert_eq!(by_degree.entries[1].key, StationKey::new("Penn", "1"));

    let by_betweenness = rank_by_betweenness(&g, false);
    assert_eq!(by_betweenness.entries[0].key, times_sq);
    assert!((by_betweenness.entries[0].score - 1.0).abs() < 1e-12);

    let summary = GraphSummary::from_graph(&g, true);
    assert_eq!(summary.station_count, 4);
    assert_eq!(summary.track_count, 3);
    assert_eq!(summary.component_count, 1);

    let station = g.station(g.node_index(&times_sq).expect("index")).expect("station");
    assert_eq!(station.borough.as_deref(), Some("Manhattan"));
    assert_eq!(station.routes.len(), 3);
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

#[test]
fn three_stations_with_equal_ridership() {
    let targets: Vec<FlowTarget> = ["A", "B", "C"]
        .iter()
        .map(|s| FlowTarget::new(key(s), 10.0))
        .collect();
    let solution = solve(&targets, &FlowOptions::default()).expect("solve");

    for (from, to, f) in solution.rows() {
        assert!(f >= 1.0);
        assert_eq!(solution.flow(to, from), Some(f));
    }
    for i in 0..3 {
        assert!((solution.inflow(i) - 10.0).abs() < 1e-6);
    }
}

#[test]
fn flow_errors_carry_codes() {
    let lonely = [FlowTarget::new(key("A"), 5.0)];
    let err = solve(&lonely, &FlowOptions::default()).expect_err("infeasible");
    assert_eq!(err.code().code(), "E3001");

    let err = solve(&[], &FlowOptions::default()).expect_err("empty");
    assert!(matches!(err, AnalysisError::InfeasibleModel { .. }));
}
