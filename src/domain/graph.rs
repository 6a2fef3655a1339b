//! Typed dependency graph over decoded class metadata.
//!
//! Backed by a petgraph `DiGraph` (insertion-ordered, so traversals are
//! reproducible) plus an id map for node lookup and an edge-id map for
//! deduplication. Edge ids are derived deterministically from
//! (source, target, kind): rebuilding the graph from identical input yields
//! identical edge identities.

use std::collections::{BTreeMap, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::Serialize;

/// Which graph to build from a class collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphView {
    Class,
    Package,
    Inheritance,
    CallGraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
    AbstractClass,
    Package,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Inheritance,
    Implementation,
    FieldDependency,
    MethodCall,
    PackageDependency,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Enum => "enum",
            NodeKind::Annotation => "annotation",
            NodeKind::Record => "record",
            NodeKind::AbstractClass => "abstract_class",
            NodeKind::Package => "package",
            NodeKind::Method => "method",
        }
    }
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Inheritance => "inheritance",
            EdgeKind::Implementation => "implementation",
            EdgeKind::FieldDependency => "field_dependency",
            EdgeKind::MethodCall => "method_call",
            EdgeKind::PackageDependency => "package_dependency",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    /// FQN, package name, or method-qualified name depending on the view.
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    /// `{source}->{target}:{kind}` — stable across rebuilds.
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub label: String,
    /// How many class-level facts collapsed into this edge.
    pub weight: u32,
}

/// Precomputed counts by node and edge kind, in deterministic order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
    pub edges_by_kind: BTreeMap<String, usize>,
}

pub struct DependencyGraph {
    pub view: GraphView,
    pub graph: DiGraph<GraphNode, GraphEdge>,
    id_to_node: HashMap<String, NodeIndex>,
    edge_ids: HashMap<String, EdgeIndex>,
}

impl DependencyGraph {
    pub fn new(view: GraphView) -> Self {
        Self {
            view,
            graph: DiGraph::new(),
            id_to_node: HashMap::new(),
            edge_ids: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&existing) = self.id_to_node.get(&node.id) {
            return existing;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.id_to_node.insert(id, idx);
        idx
    }

    /// Add an edge between two existing nodes, or bump the weight of the
    /// identical edge if it was already added. Returns false when either
    /// endpoint is not a node of this graph — out-of-set targets are
    /// dropped by policy, never materialized.
    pub fn add_edge(&mut self, source: &str, target: &str, kind: EdgeKind) -> bool {
        let (Some(&source_idx), Some(&target_idx)) =
            (self.id_to_node.get(source), self.id_to_node.get(target))
        else {
            return false;
        };

        let edge_id = Self::edge_id(source, target, kind);
        if let Some(&existing) = self.edge_ids.get(&edge_id) {
            if let Some(edge) = self.graph.edge_weight_mut(existing) {
                edge.weight += 1;
            }
            return true;
        }

        let idx = self.graph.add_edge(
            source_idx,
            target_idx,
            GraphEdge {
                id: edge_id.clone(),
                source: source.to_string(),
                target: target.to_string(),
                kind,
                label: kind.as_str().to_string(),
                weight: 1,
            },
        );
        self.edge_ids.insert(edge_id, idx);
        true
    }

    pub fn edge_id(source: &str, target: &str, kind: EdgeKind) -> String {
        format!("{source}->{target}:{}", kind.as_str())
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.id_to_node.contains_key(id)
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_node.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.graph.edge_indices().map(|idx| &self.graph[idx])
    }

    /// Outgoing neighbor ids of a node, in insertion order of their edges.
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            ..Default::default()
        };
        for node in self.nodes() {
            *stats
                .nodes_by_kind
                .entry(node.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        for edge in self.edges() {
            *stats
                .edges_by_kind
                .entry(edge.kind.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}
