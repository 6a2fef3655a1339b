//! Dependency graph construction from decoded class metadata.
//!
//! The builder needs the complete `ClassInfo` collection before it runs:
//! edges are only created between nodes of the requested view, and targets
//! outside the analyzed set are dropped silently by policy. Node allocation
//! happens first, then edge wiring — two sequential passes.

use crate::domain::graph::{
    DependencyGraph, EdgeKind, GraphNode, GraphView, NodeKind,
};
use crate::domain::metadata::{ClassCategory, ClassInfo};

use std::collections::BTreeMap;

const ROOT_OBJECT: &str = "java.lang.Object";

pub struct GraphBuilder {
    view: GraphView,
}

impl GraphBuilder {
    pub fn new(view: GraphView) -> Self {
        Self { view }
    }

    /// Build the requested view. Borrows the classes read-only; the graph
    /// copies what it needs into node properties and keeps no references
    /// back into the input.
    pub fn build(&self, classes: &[ClassInfo]) -> DependencyGraph {
        match self.view {
            GraphView::Class => self.build_class_view(classes, false),
            GraphView::Inheritance => self.build_class_view(classes, true),
            GraphView::Package => self.build_package_view(classes),
            GraphView::CallGraph => self.build_call_graph(classes),
        }
    }

    fn build_class_view(&self, classes: &[ClassInfo], hierarchy_only: bool) -> DependencyGraph {
        let mut graph = DependencyGraph::new(self.view);

        for class in classes {
            graph.add_node(class_node(class));
        }

        for class in classes {
            wire_hierarchy_edges(&mut graph, class);
            if hierarchy_only {
                continue;
            }

            for field in &class.fields {
                let target = base_type(&field.type_name);
                graph.add_edge(&class.name, target, EdgeKind::FieldDependency);
            }

            for method in &class.methods {
                for invocation in &method.invocations {
                    // Self-calls are noise in the class view.
                    if invocation.owner == class.name {
                        continue;
                    }
                    graph.add_edge(&class.name, &invocation.owner, EdgeKind::MethodCall);
                }
            }
        }

        graph
    }

    fn build_package_view(&self, classes: &[ClassInfo]) -> DependencyGraph {
        let mut graph = DependencyGraph::new(self.view);

        let mut package_of: BTreeMap<&str, &str> = BTreeMap::new();
        for class in classes {
            package_of.insert(class.name.as_str(), class.package.as_str());
        }

        for class in classes {
            graph.add_node(GraphNode {
                id: class.package.clone(),
                label: class.package.clone(),
                kind: NodeKind::Package,
                properties: BTreeMap::new(),
            });
        }

        // Any class-level dependency between two packages collapses into a
        // single package edge; the dedup map keeps one edge and bumps its
        // weight per underlying fact.
        for class in classes {
            let source = class.package.as_str();
            let mut link = |graph: &mut DependencyGraph, target_class: &str| {
                if let Some(&target) = package_of.get(target_class) {
                    if target != source {
                        graph.add_edge(source, target, EdgeKind::PackageDependency);
                    }
                }
            };

            if let Some(super_name) = &class.super_name {
                if super_name != ROOT_OBJECT {
                    link(&mut graph, super_name);
                }
            }
            for interface in &class.interfaces {
                link(&mut graph, interface);
            }
            for field in &class.fields {
                link(&mut graph, base_type(&field.type_name));
            }
            for method in &class.methods {
                for invocation in &method.invocations {
                    link(&mut graph, &invocation.owner);
                }
            }
        }

        graph
    }

    fn build_call_graph(&self, classes: &[ClassInfo]) -> DependencyGraph {
        let mut graph = DependencyGraph::new(self.view);

        for class in classes {
            for method in &class.methods {
                let id = method_id(&class.name, &method.name);
                let mut properties = BTreeMap::new();
                properties.insert("owner".to_string(), class.name.clone());
                properties.insert("descriptor".to_string(), method.descriptor.clone());
                graph.add_node(GraphNode {
                    id,
                    label: format!("{}.{}", class.simple_name, method.name),
                    kind: NodeKind::Method,
                    properties,
                });
            }
        }

        for class in classes {
            for method in &class.methods {
                let source = method_id(&class.name, &method.name);
                for invocation in &method.invocations {
                    let target = method_id(&invocation.owner, &invocation.method);
                    graph.add_edge(&source, &target, EdgeKind::MethodCall);
                }
            }
        }

        graph
    }
}

/// Node id for the call-graph view: owner FQN plus method name.
pub fn method_id(owner: &str, method: &str) -> String {
    format!("{owner}#{method}")
}

fn class_node(class: &ClassInfo) -> GraphNode {
    let mut properties = BTreeMap::new();
    properties.insert("package".to_string(), class.package.clone());
    properties.insert("category".to_string(), class.category.as_str().to_string());
    properties.insert("version".to_string(), class.version.label.clone());
    properties.insert("field_count".to_string(), class.fields.len().to_string());
    properties.insert("method_count".to_string(), class.methods.len().to_string());

    GraphNode {
        id: class.name.clone(),
        label: class.simple_name.clone(),
        kind: node_kind(class.category),
        properties,
    }
}

fn node_kind(category: ClassCategory) -> NodeKind {
    match category {
        ClassCategory::Class => NodeKind::Class,
        ClassCategory::Interface => NodeKind::Interface,
        ClassCategory::Enum => NodeKind::Enum,
        ClassCategory::Annotation => NodeKind::Annotation,
        ClassCategory::Record => NodeKind::Record,
        ClassCategory::AbstractClass => NodeKind::AbstractClass,
    }
}

fn wire_hierarchy_edges(graph: &mut DependencyGraph, class: &ClassInfo) {
    if let Some(super_name) = &class.super_name {
        // Everything extends Object; that edge carries no information.
        if super_name != ROOT_OBJECT {
            graph.add_edge(&class.name, super_name, EdgeKind::Inheritance);
        }
    }
    for interface in &class.interfaces {
        graph.add_edge(&class.name, interface, EdgeKind::Implementation);
    }
}

/// Strip array suffixes so `com.acme.Widget[][]` targets `com.acme.Widget`.
fn base_type(type_name: &str) -> &str {
    type_name.trim_end_matches("[]")
}
