//! Engine batch behavior and the filesystem adapter, end to end.

mod common;

use classdep::adapters::fs::reader::DirectoryClassSource;
use classdep::app::engine::AnalysisEngine;
use classdep::domain::graph::GraphView;
use classdep::domain::ports::ClassFileSource;

use common::fixtures::{class_calling, simple_class};
use common::mock::InMemoryClassSource;

#[test]
fn one_bad_buffer_does_not_abort_the_batch() {
    let source = InMemoryClassSource::of(&[
        ("Good.class", simple_class("batch/Good")),
        ("Corrupt.class", vec![0xca, 0xfe, 0xba, 0xbe, 0x00]),
        ("Also.class", simple_class("batch/Also")),
    ]);
    let buffers = source.load().unwrap();

    let engine = AnalysisEngine::default();
    let outcome = engine.decode_batch(&buffers);

    assert_eq!(outcome.decoded_count(), 2);
    assert_eq!(outcome.failure_count(), 1);
    assert_eq!(outcome.failures[0].source, "Corrupt.class");
    // order of successes follows input order
    assert_eq!(outcome.classes[0].name, "batch.Good");
    assert_eq!(outcome.classes[1].name, "batch.Also");
}

#[test]
fn analyze_summarizes_counts_and_failures() {
    let source = InMemoryClassSource::of(&[
        ("A.class", class_calling("sum/A", &[("sum/B", "run")])),
        ("B.class", simple_class("sum/B")),
        ("Bad.class", vec![0x00; 16]),
    ]);
    let buffers = source.load().unwrap();

    let engine = AnalysisEngine::default();
    let report = engine.analyze(&buffers, GraphView::Class);

    assert_eq!(report.class_count, 2);
    assert_eq!(report.categories.classes, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.graph.nodes.len(), 2);
    assert_eq!(report.graph.edges.len(), 1);
    assert_eq!(report.metrics.edge_count, 1);
    assert_eq!(report.method_count, 1);
}

#[test]
fn fs_adapter_feeds_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("com");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(dir.path().join("A.class"), class_calling("fs/A", &[("fs/B", "run")])).unwrap();
    std::fs::write(nested.join("B.class"), simple_class("fs/B")).unwrap();
    std::fs::write(dir.path().join("README.txt"), b"not bytecode").unwrap();

    let source = DirectoryClassSource::new(vec![dir.path().to_path_buf()]);
    let buffers = source.load().unwrap();
    assert_eq!(buffers.len(), 2);

    let engine = AnalysisEngine::default();
    let outcome = engine.decode_batch(&buffers);
    assert_eq!(outcome.decoded_count(), 2);
    assert_eq!(outcome.failure_count(), 0);

    let graph = engine.build_graph(&outcome.classes, GraphView::Class);
    assert_eq!(graph.edge_count(), 1);
}
