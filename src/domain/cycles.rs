//! Elementary cycle detection over a dependency graph.
//!
//! Depth-first search over the adjacency structure, ignoring edge types.
//! The traversal is iterative with an explicit frame stack so pathologically
//! deep graphs cannot blow the call stack. Cycles rediscovered from other
//! start nodes, or rotations of an already reported cycle, are not
//! deduplicated; that is the documented contract.

use serde::Serialize;

use crate::domain::graph::DependencyGraph;

/// One elementary cycle: first and last id are equal, closing the loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub nodes: Vec<String>,
}

impl CycleReport {
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Find every cycle discoverable by DFS from each unvisited node, in node
/// insertion order.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<CycleReport> {
    let node_count = graph.graph.node_count();
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for edge_idx in graph.graph.edge_indices() {
        if let Some((source, target)) = graph.graph.edge_endpoints(edge_idx) {
            adjacency[source.index()].push(target.index());
        }
    }

    let id_of = |index: usize| {
        graph.graph[petgraph::graph::NodeIndex::new(index)]
            .id
            .clone()
    };

    let mut cycles = Vec::new();
    let mut visited = vec![false; node_count];
    let mut on_stack = vec![false; node_count];
    let mut path: Vec<usize> = Vec::new();
    // (node, next neighbor position) frames replace recursion.
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for start in 0..node_count {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        on_stack[start] = true;
        path.push(start);
        frames.push((start, 0));

        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            if frame.1 < adjacency[node].len() {
                let neighbor = adjacency[node][frame.1];
                frame.1 += 1;

                if !visited[neighbor] {
                    visited[neighbor] = true;
                    on_stack[neighbor] = true;
                    path.push(neighbor);
                    frames.push((neighbor, 0));
                } else if on_stack[neighbor] {
                    // Close the loop from the neighbor's first occurrence on
                    // the current path through the current node.
                    if let Some(first) = path.iter().position(|&n| n == neighbor) {
                        let mut nodes: Vec<String> =
                            path[first..].iter().map(|&n| id_of(n)).collect();
                        nodes.push(id_of(neighbor));
                        cycles.push(CycleReport { nodes });
                    }
                }
            } else {
                frames.pop();
                on_stack[node] = false;
                path.pop();
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::{EdgeKind, GraphNode, GraphView, NodeKind};
    use std::collections::BTreeMap;

    fn graph_of(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new(GraphView::Class);
        for &(source, target) in edges {
            for id in [source, target] {
                graph.add_node(GraphNode {
                    id: id.to_string(),
                    label: id.to_string(),
                    kind: NodeKind::Class,
                    properties: BTreeMap::new(),
                });
            }
            graph.add_edge(source, target, EdgeKind::MethodCall);
        }
        graph
    }

    #[test]
    fn acyclic_graph_reports_nothing() {
        let graph = graph_of(&[("a", "b"), ("b", "c")]);
        assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn triangle_is_reported_closed() {
        let graph = graph_of(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let cycles = find_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        let cycle = &cycles[0];
        assert_eq!(cycle.nodes.first(), cycle.nodes.last());
        assert_eq!(cycle.len(), 3);
        let mut members: Vec<&str> = cycle.nodes[..3].iter().map(String::as_str).collect();
        members.sort_unstable();
        assert_eq!(members, ["a", "b", "c"]);
    }

    #[test]
    fn self_loop_is_a_cycle_of_one() {
        let graph = graph_of(&[("a", "a")]);
        let cycles = find_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].nodes, vec!["a", "a"]);
    }

    #[test]
    fn two_disjoint_cycles_are_both_found() {
        let graph = graph_of(&[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")]);
        let cycles = find_cycles(&graph);
        assert_eq!(cycles.len(), 2);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let names: Vec<String> = (0..10_000).map(|i| format!("n{i}")).collect();
        let mut edges: Vec<(&str, &str)> = names
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
            .collect();
        edges.push((names.last().unwrap(), names.first().unwrap()));
        let graph = graph_of(&edges);
        let cycles = find_cycles(&graph);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 10_000);
    }
}
