//! Dependency graph checks over raw work items.
//!
//! Compilation accepts dependency cycles (the layout engine draws them fine),
//! but a plan whose dependencies loop is usually a data problem worth
//! reporting. `DependencyGraph<T>` works with any type implementing
//! [`DependencyNode`] and finds cycles and dangling references without
//! recursion.

use std::collections::HashMap;

/// Trait for types that can participate in a dependency graph
pub trait DependencyNode {
    /// Unique identifier for this node
    fn id(&self) -> &str;

    /// IDs of nodes this node depends on
    fn dependencies(&self) -> &[String];
}

/// Dependency graph over borrowed nodes, iterated in input order
pub struct DependencyGraph<'a, T: DependencyNode> {
    nodes: Vec<&'a T>,
    index: HashMap<&'a str, usize>,
}

impl<'a, T: DependencyNode> DependencyGraph<'a, T> {
    /// Create a new dependency graph from a list of nodes
    ///
    /// When ids repeat, the first node with that id wins.
    pub fn new(nodes: &[&'a T]) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, &node) in nodes.iter().enumerate() {
            index.entry(node.id()).or_insert(position);
        }

        Self {
            nodes: nodes.to_vec(),
            index,
        }
    }

    /// Dependencies naming no node in the graph, as `(node, missing)` pairs
    pub fn unresolved_dependencies(&self) -> Vec<(&'a str, &'a str)> {
        self.nodes
            .iter()
            .flat_map(|&node| {
                node.dependencies()
                    .iter()
                    .filter(|dep| !self.index.contains_key(dep.as_str()))
                    .map(move |dep| (node.id(), dep.as_str()))
            })
            .collect()
    }

    /// Find dependency cycles with an iterative depth-first search.
    ///
    /// One cycle is reported per back edge found, listed in dependency order
    /// with the first id repeated at the end. Unknown dependencies are
    /// ignored.
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut cycles = Vec::new();

        for start in 0..self.nodes.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }

            // (node, index of the next dependency to visit)
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            marks[start] = Mark::OnStack;

            while let Some(top) = stack.last_mut() {
                let node = top.0;
                let deps = self.nodes[node].dependencies();
                if top.1 == deps.len() {
                    marks[node] = Mark::Done;
                    stack.pop();
                    continue;
                }

                let dep_id = deps[top.1].as_str();
                top.1 += 1;

                let Some(&dep) = self.index.get(dep_id) else {
                    continue;
                };
                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::OnStack;
                        stack.push((dep, 0));
                    }
                    Mark::OnStack => {
                        if let Some(pos) = stack.iter().position(|&(n, _)| n == dep) {
                            let mut cycle: Vec<String> = stack[pos..]
                                .iter()
                                .map(|&(n, _)| self.nodes[n].id().to_string())
                                .collect();
                            cycle.push(self.nodes[dep].id().to_string());
                            cycles.push(cycle);
                        }
                    }
                    Mark::Done => {}
                }
            }
        }

        cycles
    }
}
