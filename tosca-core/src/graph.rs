//! A small owned dependency graph with Kahn's-algorithm topological sort,
//! used to run the element pipeline's validate/parse phases in
//! dependency order (§4.2's "dependency DAG construction").

use crate::error::{CyclicDependencyCtx, SchemaApiError};
use indexmap::IndexMap;
use indexmap::IndexSet;
use std::hash::Hash;

/// A directed graph of `N`-keyed nodes with no attached weights; edges run
/// from a dependency to its dependent (i.e. `add_edge(a, b)` means `b`
/// requires `a`, so `a` must be visited first).
#[derive(Debug, Clone)]
pub struct Dag<N: Eq + Hash + Clone> {
    nodes: IndexSet<N>,
    /// dependency -> dependents
    edges: IndexMap<N, Vec<N>>,
}

impl<N: Eq + Hash + Clone + std::fmt::Debug> Default for Dag<N> {
    fn default() -> Self {
        Self { nodes: IndexSet::new(), edges: IndexMap::new() }
    }
}

impl<N: Eq + Hash + Clone + std::fmt::Debug> Dag<N> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: N) {
        self.nodes.insert(node);
    }

    /// Records that `dependent` requires `dependency` to run first.
    pub fn add_edge(&mut self, dependency: N, dependent: N) {
        self.nodes.insert(dependency.clone());
        self.nodes.insert(dependent.clone());
        self.edges.entry(dependency).or_default().push(dependent);
    }

    /// Returns nodes in an order where every dependency precedes its
    /// dependents. Fails if the graph contains a cycle.
    pub fn topological_order(&self) -> Result<Vec<N>, SchemaApiError> {
        let mut in_degree: IndexMap<N, usize> =
            self.nodes.iter().map(|n| (n.clone(), 0)).collect();
        for dependents in self.edges.values() {
            for d in dependents {
                *in_degree.entry(d.clone()).or_insert(0) += 1;
            }
        }

        let mut ready: Vec<N> = in_degree
            .iter()
            .filter(|(_, deg)| **deg == 0)
            .map(|(n, _)| n.clone())
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = ready.pop() {
            order.push(node.clone());
            if let Some(dependents) = self.edges.get(&node) {
                for dependent in dependents {
                    let deg = in_degree.get_mut(dependent).expect("node seen above");
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(dependent.clone());
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let remaining: Vec<String> = self
                .nodes
                .iter()
                .filter(|n| !order.contains(n))
                .map(|n| format!("{n:?}"))
                .collect();
            return CyclicDependencyCtx { cycle: remaining.join(", ") }.fail();
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_simple_chain() {
        let mut dag = Dag::new();
        dag.add_edge("a", "b");
        dag.add_edge("b", "c");
        let order = dag.topological_order().unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn detects_cycles() {
        let mut dag = Dag::new();
        dag.add_edge("a", "b");
        dag.add_edge("b", "a");
        assert!(dag.topological_order().is_err());
    }

    #[test]
    fn independent_nodes_any_order_but_present() {
        let mut dag = Dag::new();
        dag.add_node("x");
        dag.add_node("y");
        dag.add_edge("x", "z");
        let order = dag.topological_order().unwrap();
        assert_eq!(order.len(), 3);
        assert!(order.iter().position(|n| *n == "x").unwrap() < order.iter().position(|n| *n == "z").unwrap());
    }
}
