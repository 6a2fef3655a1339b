//! Response shapes for the CLI and other downstream consumers.
//!
//! The domain types already derive `Serialize`; these DTOs compose them into
//! the report forms the renderers consume.

use serde::Serialize;

use crate::domain::cycles::CycleReport;
use crate::domain::graph::{GraphEdge, GraphNode, GraphStats, GraphView};
use crate::domain::metadata::ClassInfo;
use crate::domain::metrics::GraphMetrics;

/// One class file that failed to decode, with enough context to log and
/// skip it.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeFailure {
    pub source: String,
    pub message: String,
}

/// Batch decode result: the successes plus every per-item failure. One bad
/// buffer never aborts the rest of the batch.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub classes: Vec<ClassInfo>,
    pub failures: Vec<DecodeFailure>,
}

impl BatchOutcome {
    pub fn decoded_count(&self) -> usize {
        self.classes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}

/// Serializable snapshot of a built graph: nodes and edges in insertion
/// order plus precomputed stats.
#[derive(Debug, Serialize)]
pub struct GraphReport {
    pub view: GraphView,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub stats: GraphStats,
}

#[derive(Debug, Serialize)]
pub struct CyclesReport {
    pub view: GraphView,
    pub cycle_count: usize,
    pub cycles: Vec<CycleReport>,
}

#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub view: GraphView,
    pub metrics: GraphMetrics,
}

/// Per-category class counts for the analysis summary.
#[derive(Debug, Default, Serialize)]
pub struct CategoryCounts {
    pub classes: usize,
    pub interfaces: usize,
    pub enums: usize,
    pub annotations: usize,
    pub records: usize,
    pub abstract_classes: usize,
}

/// End-to-end analysis: decode summary, graph, and metrics in one shape.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub class_count: usize,
    pub method_count: usize,
    pub field_count: usize,
    pub categories: CategoryCounts,
    pub failures: Vec<DecodeFailure>,
    pub graph: GraphReport,
    pub metrics: GraphMetrics,
}
