//! Connectivity metrics over a built dependency graph.
//!
//! Degrees come from a single edge scan; density guards its denominator;
//! the hub threshold is a heuristic carried as configurable policy rather
//! than a fixed law.

use serde::Serialize;

use crate::domain::cycles::{self, CycleReport};
use crate::domain::graph::DependencyGraph;

/// Tunable policy for the metrics pass.
#[derive(Debug, Clone, Copy)]
pub struct MetricsConfig {
    /// Minimum total degree for a node to count as highly connected; the
    /// effective threshold is `max(hub_floor, edge_count / node_count)`.
    pub hub_floor: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { hub_floor: 3 }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub highly_connected: Vec<String>,
    pub orphans: Vec<String>,
    pub cycles: Vec<CycleReport>,
}

/// Compute metrics for an already-built, immutable graph. Never fails; an
/// empty graph produces zeroed metrics.
pub fn compute(graph: &DependencyGraph, config: &MetricsConfig) -> GraphMetrics {
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();

    let mut in_degree = vec![0usize; node_count];
    let mut out_degree = vec![0usize; node_count];
    for edge_idx in graph.graph.edge_indices() {
        if let Some((source, target)) = graph.graph.edge_endpoints(edge_idx) {
            out_degree[source.index()] += 1;
            in_degree[target.index()] += 1;
        }
    }

    let density = if node_count > 1 {
        edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    } else {
        0.0
    };

    let hub_threshold = if node_count > 0 {
        config.hub_floor.max(edge_count / node_count)
    } else {
        config.hub_floor
    };

    let mut highly_connected = Vec::new();
    let mut orphans = Vec::new();
    for idx in graph.graph.node_indices() {
        let total = in_degree[idx.index()] + out_degree[idx.index()];
        let id = &graph.graph[idx].id;
        if total >= hub_threshold {
            highly_connected.push(id.clone());
        }
        if total == 0 {
            orphans.push(id.clone());
        }
    }

    GraphMetrics {
        node_count,
        edge_count,
        density,
        highly_connected,
        orphans,
        cycles: cycles::find_cycles(graph),
    }
}
