use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analysis::graph::DependencyGraph;

/// A closed dependency path. `path` holds the node ids in order; `display`
/// renders them with the first id repeated at the end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub path: Vec<String>,
    pub display: String,
}

impl Cycle {
    fn from_path(path: Vec<String>) -> Self {
        let mut display = path.join(" -> ");
        if let Some(first) = path.first() {
            display.push_str(" -> ");
            display.push_str(first);
        }
        Self { path, display }
    }

    /// Rotation-insensitive membership check, useful to tests and dedup-ing
    /// consumers
    pub fn contains_exactly(&self, ids: &[&str]) -> bool {
        if self.path.len() != ids.len() {
            return false;
        }
        let set: HashSet<&str> = self.path.iter().map(|s| s.as_str()).collect();
        ids.iter().all(|id| set.contains(id))
    }
}

/// Find cycles via depth-first traversal from every unvisited node.
///
/// Operates purely on graph structure. A global visited set guarantees
/// termination (no node is re-expanded after it leaves the recursion stack);
/// when traversal reaches a node already on the current recursion stack, the
/// sub-path from that node to the current one is reported as a cycle.
///
/// Guarantee: every simple cycle reachable from at least one DFS start is
/// reported at least once. Cycles reachable from several starting points are
/// NOT deduplicated and may be reported in different rotations; consumers
/// must not assume exact-once reporting.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut cycles = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    // Sorted start order keeps runs deterministic
    let mut roots: Vec<&str> = graph.nodes.keys().map(|s| s.as_str()).collect();
    roots.sort_unstable();

    let mut stack: Vec<&str> = Vec::new();
    let mut on_stack: HashSet<&str> = HashSet::new();

    for root in roots {
        if !visited.contains(root) {
            dfs(graph, root, &mut visited, &mut stack, &mut on_stack, &mut cycles);
        }
    }
    cycles
}

fn dfs<'a>(
    graph: &'a DependencyGraph,
    node: &'a str,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
    on_stack: &mut HashSet<&'a str>,
    cycles: &mut Vec<Cycle>,
) {
    visited.insert(node);
    stack.push(node);
    on_stack.insert(node);

    for next in graph.dependencies_of(node) {
        let next = next.as_str();
        if on_stack.contains(next) {
            // Sub-path from the first stack occurrence to the current node
            if let Some(pos) = stack.iter().position(|n| *n == next) {
                let path: Vec<String> = stack[pos..].iter().map(|s| s.to_string()).collect();
                cycles.push(Cycle::from_path(path));
            }
        } else if !visited.contains(next) && graph.nodes.contains_key(next) {
            // Dangling references have no adjacency to follow
            dfs(graph, next, visited, stack, on_stack, cycles);
        }
    }

    stack.pop();
    on_stack.remove(node);
}
