use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::analysis::declarations::{Declaration, DeclarationKind};
use crate::analysis::extractor::normalize_type_name;
use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Inheritance,
    Usage,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Inheritance => write!(f, "inheritance"),
            EdgeKind::Usage => write!(f, "usage"),
        }
    }
}

/// Graph node; id is the declaration's fully-qualified name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyNode {
    pub id: String,
    pub kind: DeclarationKind,
    pub file: String,
}

/// Directed edge. `to` is a symbolic name and may have no matching node
/// (dangling reference); consumers must tolerate a missing far end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

/// Dependency graph over all declarations of one analysis run.
///
/// Forward and reverse adjacency are maintained together so that
/// "who depends on me" is a map lookup rather than an edge scan.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub nodes: HashMap<String, DependencyNode>,
    pub edges: Vec<DependencyEdge>,
    pub direct_dependencies: HashMap<String, Vec<String>>,
    pub reverse_dependencies: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn dependencies_of(&self, id: &str) -> &[String] {
        self.direct_dependencies
            .get(id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn dependents_of(&self, id: &str) -> &[String] {
        self.reverse_dependencies
            .get(id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    fn add_node(&mut self, node: DependencyNode) {
        self.direct_dependencies.entry(node.id.clone()).or_default();
        self.reverse_dependencies.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
    }

    fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind) {
        self.direct_dependencies
            .entry(from.to_string())
            .or_default()
            .push(to.to_string());
        self.reverse_dependencies
            .entry(to.to_string())
            .or_default()
            .push(from.to_string());
        self.edges.push(DependencyEdge {
            from: from.to_string(),
            to: to.to_string(),
            kind,
        });
    }
}

/// Build the graph: one node per declaration, edges for base-list references
/// and for non-primitive method parameter/return types.
///
/// Targets are recorded by simple name resolved against the declaration set
/// when possible (namespace-qualified id), otherwise kept symbolic. Generic
/// wrappers contribute their outer identifier (`List<Enemy>` → `List`);
/// primitives are dropped via the configured deny-list. Duplicate
/// `(from, to, kind)` edges are not created twice per source declaration.
pub fn build_graph(declarations: &[Declaration], config: &AnalysisConfig) -> DependencyGraph {
    let mut graph = DependencyGraph::default();

    // Simple name → node id, for resolving symbolic references
    let mut by_simple_name: HashMap<&str, &str> = HashMap::new();
    for decl in declarations {
        by_simple_name
            .entry(decl.name.as_str())
            .or_insert(decl.full_name.as_str());
    }

    for decl in declarations {
        graph.add_node(DependencyNode {
            id: decl.full_name.clone(),
            kind: decl.kind,
            file: decl.file.clone(),
        });
    }

    for decl in declarations {
        let base_names: HashSet<&str> = decl.base_list().map(|s| s.as_str()).collect();
        let mut emitted: HashSet<(String, EdgeKind)> = HashSet::new();

        let mut push_edge = |graph: &mut DependencyGraph, raw: &str, kind: EdgeKind| {
            let simple = normalize_type_name(raw);
            if simple.is_empty() || config.is_primitive(&simple) || simple == decl.name {
                return;
            }
            let target = by_simple_name
                .get(simple.as_str())
                .map(|id| id.to_string())
                .unwrap_or(simple);
            if emitted.insert((target.clone(), kind)) {
                graph.add_edge(&decl.full_name, &target, kind);
            }
        };

        for base in decl.base_list() {
            push_edge(&mut graph, base, EdgeKind::Inheritance);
        }
        for method in &decl.methods {
            if !method.return_type.is_empty() {
                let kind = edge_kind_for(&method.return_type, &base_names);
                push_edge(&mut graph, &method.return_type, kind);
            }
            for param in &method.parameters {
                let kind = edge_kind_for(&param.type_name, &base_names);
                push_edge(&mut graph, &param.type_name, kind);
            }
        }
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "dependency graph built"
    );
    graph
}

/// Usage by default; Inheritance when the target already appears in the
/// declaring type's base/interface lists
fn edge_kind_for(raw: &str, base_names: &HashSet<&str>) -> EdgeKind {
    if base_names.contains(normalize_type_name(raw).as_str()) {
        EdgeKind::Inheritance
    } else {
        EdgeKind::Usage
    }
}
