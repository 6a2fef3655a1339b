//! End-to-end graph behavior: decoded bytes through builder, cycle
//! detection, and metrics.

mod common;

use classdep::app::engine::AnalysisEngine;
use classdep::domain::graph::{EdgeKind, GraphView};
use classdep::domain::metrics::MetricsConfig;
use classdep::domain::ports::ClassFileBuffer;

use common::fixtures::{class_calling, simple_class};

fn buffers(entries: &[(&str, Vec<u8>)]) -> Vec<ClassFileBuffer> {
    entries
        .iter()
        .map(|(source, bytes)| ClassFileBuffer::new(*source, bytes.clone()))
        .collect()
}

#[test]
fn calls_to_classes_outside_the_set_produce_no_edges() {
    let inputs = buffers(&[
        (
            "A.class",
            class_calling("com/acme/A", &[("com/acme/B", "work"), ("ext/C", "poke")]),
        ),
        ("B.class", simple_class("com/acme/B")),
    ]);

    let engine = AnalysisEngine::default();
    let outcome = engine.decode_batch(&inputs);
    assert_eq!(outcome.failure_count(), 0);

    let graph = engine.build_graph(&outcome.classes, GraphView::Class);
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    let edge = graph.edges().next().unwrap();
    assert_eq!(edge.source, "com.acme.A");
    assert_eq!(edge.target, "com.acme.B");
    assert_eq!(edge.kind, EdgeKind::MethodCall);
    assert!(!graph.contains_node("ext.C"));
}

#[test]
fn call_cycle_is_reported_once_with_all_members() {
    let inputs = buffers(&[
        ("A.class", class_calling("cy/A", &[("cy/B", "run")])),
        ("B.class", class_calling("cy/B", &[("cy/C", "run")])),
        ("C.class", class_calling("cy/C", &[("cy/A", "run")])),
    ]);

    let engine = AnalysisEngine::default();
    let outcome = engine.decode_batch(&inputs);
    let graph = engine.build_graph(&outcome.classes, GraphView::Class);
    let report = engine.find_cycles(&graph);

    assert_eq!(report.cycle_count, 1);
    let cycle = &report.cycles[0];
    assert_eq!(cycle.nodes.first(), cycle.nodes.last());
    let mut members: Vec<&str> = cycle.nodes[..cycle.len()]
        .iter()
        .map(String::as_str)
        .collect();
    members.sort_unstable();
    assert_eq!(members, ["cy.A", "cy.B", "cy.C"]);
}

#[test]
fn isolated_classes_are_orphans_with_zero_density_contribution() {
    let inputs = buffers(&[
        ("A.class", class_calling("m/A", &[("m/B", "run")])),
        ("B.class", simple_class("m/B")),
        ("Loner.class", simple_class("m/Loner")),
    ]);

    let engine = AnalysisEngine::default();
    let outcome = engine.decode_batch(&inputs);
    let graph = engine.build_graph(&outcome.classes, GraphView::Class);
    let metrics = engine.compute_metrics(&graph);

    assert_eq!(metrics.node_count, 3);
    assert_eq!(metrics.edge_count, 1);
    assert_eq!(metrics.orphans, vec!["m.Loner"]);
    // one edge over 3*2 ordered pairs
    assert!((metrics.density - 1.0 / 6.0).abs() < 1e-9);
    assert!(metrics.cycles.is_empty());
}

#[test]
fn hub_floor_is_configurable() {
    let inputs = buffers(&[
        (
            "Hub.class",
            class_calling(
                "h/Hub",
                &[("h/A", "run"), ("h/B", "run"), ("h/C", "run")],
            ),
        ),
        ("A.class", simple_class("h/A")),
        ("B.class", simple_class("h/B")),
        ("C.class", simple_class("h/C")),
    ]);

    let engine = AnalysisEngine::default();
    let outcome = engine.decode_batch(&inputs);
    let graph = engine.build_graph(&outcome.classes, GraphView::Class);

    let default_metrics = engine.compute_metrics(&graph);
    assert_eq!(default_metrics.highly_connected, vec!["h.Hub"]);

    let strict = AnalysisEngine::default().with_metrics_config(MetricsConfig { hub_floor: 5 });
    let strict_metrics = strict.compute_metrics(&graph);
    assert!(strict_metrics.highly_connected.is_empty());
}

#[test]
fn package_view_collapses_class_edges() {
    let inputs = buffers(&[
        ("A1.class", class_calling("pa/A1", &[("pb/B", "run")])),
        ("A2.class", class_calling("pa/A2", &[("pb/B", "run")])),
        ("B.class", simple_class("pb/B")),
    ]);

    let engine = AnalysisEngine::default();
    let outcome = engine.decode_batch(&inputs);
    let graph = engine.build_graph(&outcome.classes, GraphView::Package);

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    let edge = graph.edges().next().unwrap();
    assert_eq!(edge.source, "pa");
    assert_eq!(edge.target, "pb");
    assert_eq!(edge.kind, EdgeKind::PackageDependency);
    assert_eq!(edge.weight, 2);
}

#[test]
fn call_graph_view_links_methods() {
    let inputs = buffers(&[
        ("A.class", class_calling("g/A", &[("g/B", "run")])),
        ("B.class", class_calling("g/B", &[])),
    ]);

    let engine = AnalysisEngine::default();
    let outcome = engine.decode_batch(&inputs);
    let graph = engine.build_graph(&outcome.classes, GraphView::CallGraph);

    assert!(graph.contains_node("g.A#run"));
    assert!(graph.contains_node("g.B#run"));
    assert_eq!(graph.edge_count(), 1);
    let edge = graph.edges().next().unwrap();
    assert_eq!(edge.source, "g.A#run");
    assert_eq!(edge.target, "g.B#run");
}
