//! Topological ordering of named nodes with declared dependency sets.
//!
//! The graph produces a "build chain": an ordering in which every node
//! appears strictly after all of its dependencies. Ties between independent
//! nodes follow original insertion order, so a given input always produces
//! the same chain.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// A node that can participate in dependency resolution.
pub trait DependencyNode {
    /// Unique id of this node.
    fn id(&self) -> &str;

    /// Ids of the nodes this node depends on.
    fn dependencies(&self) -> Vec<String>;
}

impl<T: DependencyNode> DependencyNode for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn dependencies(&self) -> Vec<String> {
        (**self).dependencies()
    }
}

/// Visit state during the depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    /// On the current DFS path; reaching a `Visiting` node again is a cycle.
    Visiting,
    Visited,
}

/// Dependency graph over named nodes, resolved into a build chain.
pub struct DependencyGraph<T> {
    nodes: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: DependencyNode> DependencyGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a node. A node added later shadows an earlier one with the same id.
    pub fn add(&mut self, node: T) {
        self.index.insert(node.id().to_string(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Add every node of an iterator, in iteration order.
    pub fn add_all(&mut self, nodes: impl IntoIterator<Item = T>) {
        for node in nodes {
            self.add(node);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve the build chain: every node strictly after its dependencies.
    ///
    /// Fails with [`Error::DependencyCycle`] (reporting the offending chain)
    /// or [`Error::UnresolvedDependency`] when a declared dependency id is
    /// not present among the nodes.
    pub fn build_chain(&self) -> Result<Vec<&T>> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut trail = Vec::new();
        let mut chain = Vec::with_capacity(self.nodes.len());

        for i in 0..self.nodes.len() {
            // shadowed duplicates never enter the chain
            if self.index.get(self.nodes[i].id()) != Some(&i) {
                continue;
            }
            if marks[i] == Mark::Unvisited {
                self.visit(i, &mut marks, &mut trail, &mut chain)?;
            }
        }

        Ok(chain)
    }

    fn visit<'a>(
        &'a self,
        i: usize,
        marks: &mut Vec<Mark>,
        trail: &mut Vec<usize>,
        chain: &mut Vec<&'a T>,
    ) -> Result<()> {
        marks[i] = Mark::Visiting;
        trail.push(i);

        let mut deps = Vec::new();
        for dep in self.nodes[i].dependencies() {
            match self.index.get(&dep) {
                Some(&j) => deps.push(j),
                None => {
                    return Err(Error::UnresolvedDependency {
                        node: self.nodes[i].id().to_string(),
                        dependency: dep,
                    });
                }
            }
        }
        // insertion order keeps the walk deterministic
        deps.sort_unstable();
        deps.dedup();

        for j in deps {
            match marks[j] {
                Mark::Visited => {}
                Mark::Visiting => {
                    return Err(Error::DependencyCycle(self.cycle_chain(trail, j)));
                }
                Mark::Unvisited => self.visit(j, marks, trail, chain)?,
            }
        }

        trail.pop();
        marks[i] = Mark::Visited;
        chain.push(&self.nodes[i]);
        Ok(())
    }

    /// Render the cycle from its first occurrence on the trail back to itself.
    fn cycle_chain(&self, trail: &[usize], repeat: usize) -> String {
        let start = trail.iter().position(|&i| i == repeat).unwrap_or(0);
        let mut names: Vec<&str> = trail[start..].iter().map(|&i| self.nodes[i].id()).collect();
        names.push(self.nodes[repeat].id());
        names.join(" -> ")
    }
}

impl<T: DependencyNode> Default for DependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}
