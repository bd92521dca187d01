//! Reference graph recorded during forward walks.
//!
//! Nodes are unresolved specifier strings exactly as they appear in template
//! bodies; an edge `a → b` means template `a` references `b`. Cycles are legal
//! (two templates including each other is valid Twig), so cycle detection
//! reports the offending path instead of failing.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is on the current DFS path.
    Gray,
    /// Node and everything below it has been visited.
    Black,
}

/// Directed graph of template references.
#[derive(Debug, Default)]
pub struct TemplateGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl TemplateGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node if it doesn't already exist and returns its index.
    pub fn ensure_node(&mut self, specifier: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(specifier) {
            index
        } else {
            let index = self.graph.add_node(specifier.to_string());
            self.node_map.insert(specifier.to_string(), index);
            index
        }
    }

    /// Records that `from` references `to`. Duplicate edges are ignored.
    pub fn add_reference(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Direct references of `specifier`, in the order they were recorded.
    #[must_use]
    pub fn references_of(&self, specifier: &str) -> Vec<String> {
        self.node_map
            .get(specifier)
            .map(|&idx| self.ordered_neighbors(idx).map(|n| self.graph[n].clone()).collect())
            .unwrap_or_default()
    }

    /// Every specifier reachable from `specifier`, excluding itself unless it
    /// sits on a cycle.
    #[must_use]
    pub fn reachable_from(&self, specifier: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(&start) = self.node_map.get(specifier) {
            queue.push_back(start);

            while let Some(current) = queue.pop_front() {
                for neighbor in self.graph.neighbors(current) {
                    if seen.insert(self.graph[neighbor].clone()) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        seen
    }

    /// Finds one reference cycle, if any.
    ///
    /// The returned path starts and ends with the same specifier, e.g.
    /// `["a.twig", "b.twig", "a.twig"]`.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|n| (n, Color::White)).collect();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path)
            {
                return Some(cycle.into_iter().map(|n| self.graph[n].clone()).collect());
            }
        }

        None
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for neighbor in self.ordered_neighbors(node) {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|n| *n == neighbor).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(neighbor);
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(neighbor, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// petgraph yields neighbors newest-first; reverse to recording order.
    fn ordered_neighbors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> {
        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.reverse();
        neighbors.into_iter()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of distinct specifiers.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct references.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Renders the references below `root` as an ASCII tree.
    ///
    /// A specifier that was already printed higher up is marked as a circular
    /// reference instead of being expanded again.
    #[must_use]
    pub fn to_tree_string(&self, root: &str) -> String {
        let mut result = format!("{root}\n");
        let mut visited = HashSet::from([root.to_string()]);
        let children = self.references_of(root);

        for (i, child) in children.iter().enumerate() {
            self.build_tree_string(child, &mut result, "", i == children.len() - 1, &mut visited);
        }
        result
    }

    fn build_tree_string(
        &self,
        specifier: &str,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<String>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(specifier.to_string()) {
            result.push_str(&format!("{prefix}{connector}{specifier} (circular reference)\n"));
            return;
        }
        result.push_str(&format!("{prefix}{connector}{specifier}\n"));

        let children = self.references_of(specifier);
        for (i, child) in children.iter().enumerate() {
            self.build_tree_string(child, result, &child_prefix, i == children.len() - 1, visited);
        }
        visited.remove(specifier);
    }
}
