use std::ops::ControlFlow;

use proptest::prelude::*;
use sssp_partitioned::kernel::relax_partition;
use sssp_partitioned::{
    fixpoint_violations, partition_edges, reference_bellman_ford, solve, Coordinator, CoordinatorConfig, Distance, Graph,
    ReferenceOptions, RelaxMode, RunStatus, VertexId, Weight, UNREACHABLE,
};

fn diamond() -> Graph {
    Graph::from_triples(4, [(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap()
}

#[test]
fn single_vertex_converges_in_first_round() {
    let g = Graph::new(1, Vec::new()).unwrap();
    for n in [1, 3] {
        let out = solve(&g, CoordinatorConfig::new(n)).unwrap();
        assert_eq!(out.distances, vec![0]);
        assert_eq!(out.status, RunStatus::Converged { rounds: 1 });
    }
}

#[test]
fn diamond_shortest_paths() {
    for mode in [RelaxMode::SinglePass, RelaxMode::multi_pass(2), RelaxMode::until_fixpoint()] {
        for n in [1, 2, 3] {
            let out = solve(&diamond(), CoordinatorConfig::new(n).with_mode(mode)).unwrap();
            assert_eq!(out.distances, vec![0, 1, 3, 4], "workers={n} mode={mode:?}");
        }
    }
}

#[test]
fn disconnected_vertex_stays_unreachable() {
    // vertex 4 has only outgoing edges, vertex 5 is isolated
    let g = Graph::from_triples(6, [(0, 1, 2), (4, 1, 1), (1, 2, 2), (2, 3, 2), (4, 3, 1)]).unwrap();
    for n in [1, 2, 5, 7] {
        let out = solve(&g, CoordinatorConfig::new(n)).unwrap();
        assert!(out.status.is_converged());
        assert_eq!(out.distances, vec![0, 2, 4, 6, UNREACHABLE, UNREACHABLE], "workers={n}");
    }
}

#[test]
fn zero_weight_cycle_still_converges() {
    let g = Graph::from_triples(4, [(0, 1, 3), (1, 2, 0), (2, 1, 0), (2, 3, 4), (3, 3, 0)]).unwrap();
    for n in [1, 2, 3] {
        let out = solve(&g, CoordinatorConfig::new(n)).unwrap();
        assert!(out.status.is_converged(), "workers={n}: {:?}", out.status);
        assert_eq!(out.distances, vec![0, 3, 3, 7]);
    }
}

#[test]
fn more_workers_than_edges() {
    let g = diamond();
    let mut coordinator = Coordinator::new(&g, CoordinatorConfig::new(9)).unwrap();
    let sizes: Vec<_> = coordinator.partitions().iter().map(|p| p.len()).collect();
    assert_eq!(sizes, vec![1, 1, 1, 1, 0, 0, 0, 0, 0]);
    let mut idle_changed = false;
    let out = coordinator
        .run_with(|r| {
            idle_changed |= r.worker_stats[4..].iter().any(|s| s.changed || s.relaxations > 0);
            ControlFlow::Continue(())
        })
        .unwrap();
    assert!(!idle_changed);
    assert!(out.status.is_converged());
    assert_eq!(out.distances, vec![0, 1, 3, 4]);
    assert_eq!(out.metrics.partition_sizes, sizes);
}

#[test]
fn graph_with_no_edges() {
    let g = Graph::new(3, Vec::new()).unwrap();
    let out = solve(&g, CoordinatorConfig::new(2).with_source(1)).unwrap();
    assert_eq!(out.status, RunStatus::Converged { rounds: 1 });
    assert_eq!(out.distances, vec![UNREACHABLE, 0, UNREACHABLE]);
}

#[test]
fn time_budget_aborts_at_round_boundary() {
    let n = 200u32;
    let g = Graph::from_triples(n as usize, (0..n - 1).rev().map(|u| (u, u + 1, 1))).unwrap();
    let out = solve(&g, CoordinatorConfig::new(2).with_time_budget(std::time::Duration::ZERO)).unwrap();
    assert_eq!(out.status, RunStatus::Aborted { rounds: 1 });
    assert_eq!(out.distances[1], 1);
    assert_eq!(out.distances[2], UNREACHABLE);
}

#[test]
fn zero_workers_rejected_before_any_round() {
    assert!(solve(&diamond(), CoordinatorConfig::new(0)).is_err());
}

#[test]
fn zero_round_budget_rejected_before_any_round() {
    let g = Graph::from_triples(2, [(0, 1, 1)]).unwrap();
    assert!(matches!(solve(&g, CoordinatorConfig::new(1).with_max_rounds(0)), Err(sssp_partitioned::SsspError::InvalidConfiguration(_))));
}

fn nonnegative_graph() -> impl Strategy<Value = Graph> {
    (1usize..14).prop_flat_map(|n| {
        let v = n as VertexId;
        proptest::collection::vec((0..v, 0..v, 0 as Weight..25), 0..48)
            .prop_map(move |t| Graph::from_triples(n, t).unwrap())
    })
}

// edges only from lower to higher ids: negative weights without cycles
fn negative_dag() -> impl Strategy<Value = Graph> {
    (2usize..14).prop_flat_map(|n| {
        let v = n as VertexId;
        proptest::collection::vec((0..v, 0..v, -30 as Weight..30), 0..48).prop_map(move |t| {
            let t = t.into_iter().filter(|(a, b, _)| a != b).map(|(a, b, w)| (a.min(b), a.max(b), w));
            Graph::from_triples(n, t).unwrap()
        })
    })
}

fn any_graph() -> impl Strategy<Value = Graph> {
    prop_oneof![nonnegative_graph(), negative_dag()]
}

fn any_mode() -> impl Strategy<Value = RelaxMode> {
    prop_oneof![Just(RelaxMode::SinglePass), (2usize..5).prop_map(RelaxMode::multi_pass), Just(RelaxMode::until_fixpoint())]
}

proptest! {
    #[test]
    fn distances_never_increase_between_rounds(g in any_graph(), workers in 1usize..6, mode in any_mode()) {
        let mut prev: Vec<Distance> = vec![UNREACHABLE; g.vertex_count()];
        prev[0] = 0;
        let mut rounds_seen = 0;
        let out = Coordinator::new(&g, CoordinatorConfig::new(workers).with_mode(mode))
            .unwrap()
            .run_with(|r| {
                rounds_seen += 1;
                assert_eq!(r.round, rounds_seen);
                for (v, (now, before)) in r.distances.iter().zip(&prev).enumerate() {
                    assert!(now <= before, "vertex {v} rose from {before} to {now} in round {}", r.round);
                }
                prev = r.distances.to_vec();
                ControlFlow::Continue(())
            })
            .unwrap();
        prop_assert!(out.status.is_converged());
        prop_assert_eq!(out.distances, prev);
    }

    #[test]
    fn converged_vector_is_a_fixpoint(g in any_graph(), workers in 1usize..6, mode in any_mode()) {
        let out = solve(&g, CoordinatorConfig::new(workers).with_mode(mode)).unwrap();
        prop_assert!(out.status.is_converged());
        prop_assert!(fixpoint_violations(&g, &out.distances).unwrap().is_empty());
    }

    #[test]
    fn worker_count_does_not_change_result(g in any_graph(), mode in any_mode()) {
        let base = solve(&g, CoordinatorConfig::new(1).with_mode(mode)).unwrap().distances;
        for n in [2, 5, 7, 11] {
            let out = solve(&g, CoordinatorConfig::new(n).with_mode(mode)).unwrap();
            prop_assert_eq!(&out.distances, &base, "workers={}", n);
        }
    }

    #[test]
    fn matches_reference(g in any_graph(), workers in 1usize..8, mode in any_mode(), src in 0u32..14) {
        let src = src % g.vertex_count() as u32;
        let expected = reference_bellman_ford(&g, src, ReferenceOptions::default()).unwrap().distances;
        let out = solve(&g, CoordinatorConfig::new(workers).with_mode(mode).with_source(src)).unwrap();
        prop_assert!(out.status.is_converged());
        prop_assert_eq!(out.distances, expected);
    }

    #[test]
    fn extra_rounds_change_nothing(g in any_graph(), workers in 1usize..6) {
        let out = solve(&g, CoordinatorConfig::new(workers)).unwrap();
        prop_assert!(out.status.is_converged());
        let longer = solve(&g, CoordinatorConfig::new(workers).with_max_rounds(3 * g.vertex_count() + 3)).unwrap();
        prop_assert_eq!(&longer.distances, &out.distances);
        for p in partition_edges(g.edge_count(), workers).unwrap() {
            let again = relax_partition(p.edges(g.edges()), &out.distances, RelaxMode::until_fixpoint());
            prop_assert!(!again.stats.changed);
            prop_assert_eq!(&again.distances, &out.distances);
        }
    }
}
