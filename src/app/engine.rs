//! Analysis orchestration: parallel batch decode, graph build, cycles,
//! metrics.
//!
//! Each class file decodes independently, so the batch fans out across a
//! rayon worker pool and collects successes and failures without one bad
//! input aborting the rest. The graph build is the synchronization point
//! after the decode phase: it needs the complete class collection to filter
//! cross-references correctly.

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::app::dto::{
    AnalysisReport, BatchOutcome, CategoryCounts, CyclesReport, DecodeFailure, GraphReport,
    MetricsReport,
};
use crate::classfile::{self, DecodeOptions};
use crate::domain::builder::GraphBuilder;
use crate::domain::cycles;
use crate::domain::graph::{DependencyGraph, GraphView};
use crate::domain::metadata::{ClassCategory, ClassInfo};
use crate::domain::metrics::{self, GraphMetrics, MetricsConfig};
use crate::domain::ports::ClassFileBuffer;

pub struct AnalysisEngine {
    options: DecodeOptions,
    metrics_config: MetricsConfig,
}

impl AnalysisEngine {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            metrics_config: MetricsConfig::default(),
        }
    }

    pub fn with_metrics_config(mut self, config: MetricsConfig) -> Self {
        self.metrics_config = config;
        self
    }

    /// Decode every buffer, in parallel, preserving input order. N inputs
    /// with K failures yield N-K classes plus K failures.
    pub fn decode_batch(&self, inputs: &[ClassFileBuffer]) -> BatchOutcome {
        let results: Vec<Result<ClassInfo, DecodeFailure>> = inputs
            .par_iter()
            .map(|input| {
                classfile::decode_class(&input.bytes, &self.options).map_err(|err| DecodeFailure {
                    source: input.source.clone(),
                    message: err.to_string(),
                })
            })
            .collect();

        let mut outcome = BatchOutcome::default();
        for result in results {
            match result {
                Ok(class) => outcome.classes.push(class),
                Err(failure) => {
                    warn!(source = %failure.source, error = %failure.message, "decode failed");
                    outcome.failures.push(failure);
                }
            }
        }
        info!(
            decoded = outcome.decoded_count(),
            failed = outcome.failure_count(),
            "batch decode finished"
        );
        outcome
    }

    pub fn build_graph(&self, classes: &[ClassInfo], view: GraphView) -> DependencyGraph {
        let graph = GraphBuilder::new(view).build(classes);
        debug!(
            ?view,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph built"
        );
        graph
    }

    pub fn find_cycles(&self, graph: &DependencyGraph) -> CyclesReport {
        let found = cycles::find_cycles(graph);
        CyclesReport {
            view: graph.view,
            cycle_count: found.len(),
            cycles: found,
        }
    }

    pub fn compute_metrics(&self, graph: &DependencyGraph) -> GraphMetrics {
        metrics::compute(graph, &self.metrics_config)
    }

    pub fn graph_report(&self, graph: &DependencyGraph) -> GraphReport {
        GraphReport {
            view: graph.view,
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().cloned().collect(),
            stats: graph.stats(),
        }
    }

    pub fn metrics_report(&self, graph: &DependencyGraph) -> MetricsReport {
        MetricsReport {
            view: graph.view,
            metrics: self.compute_metrics(graph),
        }
    }

    /// End-to-end: decode, build the requested view, compute metrics, and
    /// summarize. Failures ride along in the report rather than being
    /// dropped.
    pub fn analyze(&self, inputs: &[ClassFileBuffer], view: GraphView) -> AnalysisReport {
        let outcome = self.decode_batch(inputs);
        let graph = self.build_graph(&outcome.classes, view);
        let metrics = self.compute_metrics(&graph);

        let mut categories = CategoryCounts::default();
        for class in &outcome.classes {
            match class.category {
                ClassCategory::Class => categories.classes += 1,
                ClassCategory::Interface => categories.interfaces += 1,
                ClassCategory::Enum => categories.enums += 1,
                ClassCategory::Annotation => categories.annotations += 1,
                ClassCategory::Record => categories.records += 1,
                ClassCategory::AbstractClass => categories.abstract_classes += 1,
            }
        }

        AnalysisReport {
            class_count: outcome.classes.len(),
            method_count: outcome.classes.iter().map(|c| c.methods.len()).sum(),
            field_count: outcome.classes.iter().map(|c| c.fields.len()).sum(),
            categories,
            failures: outcome.failures,
            graph: self.graph_report(&graph),
            metrics,
        }
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}
