//! Dependency graph: adjacency over implementation tokens, cycle detection
//! via DFS with a recursion-stack set, and deterministic topological order.

use std::collections::{BTreeMap, HashSet};

/// Adjacency map token -> dependency tokens. BTreeMap keeps traversal order
/// deterministic across runs.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, token: impl Into<String>) {
        self.edges.entry(token.into()).or_default();
    }

    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let to = to.into();
        let deps = self.edges.entry(from.into()).or_default();
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    pub fn dependencies_of(&self, token: &str) -> &[String] {
        self.edges.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.edges.keys()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn adjacency(&self) -> &BTreeMap<String, Vec<String>> {
        &self.edges
    }

    /// Detect every cycle reachable from any node. Each cycle is reported as
    /// the exact token sequence from its first repeated node.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles = Vec::new();
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut path = Vec::new();

        for token in self.edges.keys() {
            if !visited.contains(token.as_str()) {
                self.walk_for_cycle(token, &mut visited, &mut rec_stack, &mut path, &mut cycles);
            }
        }
        cycles
    }

    fn walk_for_cycle(
        &self,
        token: &str,
        visited: &mut HashSet<String>,
        rec_stack: &mut HashSet<String>,
        path: &mut Vec<String>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        visited.insert(token.to_string());
        rec_stack.insert(token.to_string());
        path.push(token.to_string());

        for dep in self.dependencies_of(token) {
            if !visited.contains(dep.as_str()) {
                self.walk_for_cycle(dep, visited, rec_stack, path, cycles);
            } else if rec_stack.contains(dep.as_str()) {
                // Back edge: slice the path from the repeated node
                let start = path.iter().position(|t| t == dep).unwrap_or(0);
                cycles.push(path[start..].to_vec());
            }
        }

        rec_stack.remove(token);
        path.pop();
    }

    /// DFS post-order guaranteeing every dependency precedes its dependents.
    /// Fails with the offending cycle when the graph is not acyclic.
    pub fn topological_order(&self) -> Result<Vec<String>, Vec<String>> {
        let mut visited = HashSet::new();
        let mut in_progress = HashSet::new();
        let mut order = Vec::new();

        for token in self.edges.keys() {
            if !visited.contains(token.as_str()) {
                self.visit(token, &mut visited, &mut in_progress, &mut order)?;
            }
        }
        Ok(order)
    }

    fn visit(
        &self,
        token: &str,
        visited: &mut HashSet<String>,
        in_progress: &mut HashSet<String>,
        order: &mut Vec<String>,
    ) -> Result<(), Vec<String>> {
        if in_progress.contains(token) {
            // Reuse the full detector so the reported cycle is exact
            let cycles = self.detect_cycles();
            return Err(cycles.into_iter().next().unwrap_or_else(|| vec![token.to_string()]));
        }
        if visited.contains(token) {
            return Ok(());
        }

        in_progress.insert(token.to_string());
        for dep in self.dependencies_of(token) {
            self.visit(dep, visited, in_progress, order)?;
        }
        in_progress.remove(token);
        visited.insert(token.to_string());
        order.push(token.to_string());
        Ok(())
    }

    /// Length of the longest dependency chain; 0 for an empty graph, 1 for a
    /// graph with only isolated nodes. Meaningless if cycles exist.
    pub fn max_depth(&self) -> usize {
        let Ok(order) = self.topological_order() else {
            return 0;
        };
        let mut depth: BTreeMap<&str, usize> = BTreeMap::new();
        for token in &order {
            let deepest_dep = self
                .dependencies_of(token)
                .iter()
                .filter_map(|d| depth.get(d.as_str()).copied())
                .max()
                .unwrap_or(0);
            depth.insert(token, deepest_dep + 1);
        }
        depth.values().copied().max().unwrap_or(0)
    }
}
