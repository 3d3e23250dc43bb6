//! Cycle-tolerant topological sequencing
//!
//! A bounded-retry variant of Kahn's algorithm. Units are popped from a
//! queue in discovery order; a unit with a dependency still waiting in the
//! queue is pushed back to the tail, at most `retry_budget` times. Once
//! finalized, a unit is relaxed out of every pending dependency set.
//!
//! Units that used up their whole budget are reported as circular but are
//! still emitted, so the output always contains every input unit.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use super::builder::DependencyGraph;
use super::extract::DependencySet;
use crate::source::Identity;

/// Default number of times a blocked unit may be requeued.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

/// Result of sequencing a dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sequence {
    /// Every unit, dependencies first where the graph allows it
    pub order: Vec<Identity>,
    /// Units that exhausted their retry budget
    pub circular: IndexSet<Identity>,
    /// Total number of requeue operations performed
    pub requeues: usize,
}

impl Sequence {
    pub fn is_circular(&self, identity: &Identity) -> bool {
        self.circular.contains(identity)
    }

    pub fn position(&self, identity: &Identity) -> Option<usize> {
        self.order.iter().position(|id| id == identity)
    }
}

/// Linearizes dependency sets.
#[derive(Debug, Clone, Copy)]
pub struct Sequencer {
    retry_budget: u32,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    /// Sequence a built graph.
    pub fn sequence(&self, graph: &DependencyGraph) -> Sequence {
        self.sequence_edges(graph.edges().map(|(id, deps)| (id.clone(), deps.clone())))
    }

    /// Sequence (identity, dependencies) pairs given in discovery order.
    pub fn sequence_edges<I>(&self, edges: I) -> Sequence
    where
        I: IntoIterator<Item = (Identity, DependencySet)>,
    {
        let mut working: IndexMap<Identity, DependencySet> = edges.into_iter().collect();
        let mut queue: VecDeque<Identity> = working.keys().cloned().collect();
        let mut queued: FxHashSet<Identity> = queue.iter().cloned().collect();
        let mut retries: FxHashMap<Identity, u32> = FxHashMap::default();
        let mut sequence = Sequence::default();

        while let Some(identity) = queue.pop_front() {
            queued.remove(&identity);

            let blocked = working
                .get(&identity)
                .map(|deps| deps.iter().any(|dep| queued.contains(dep)))
                .unwrap_or(false);
            let attempts = retries.entry(identity.clone()).or_insert(0);

            if blocked && *attempts < self.retry_budget {
                *attempts += 1;
                sequence.requeues += 1;
                debug!(%identity, attempt = *attempts, "dependencies pending, requeueing");
                queued.insert(identity.clone());
                queue.push_back(identity);
                continue;
            }

            if *attempts >= self.retry_budget && (blocked || *attempts > 0) {
                warn!(%identity, "unresolved after retry budget, emitting with guard");
                sequence.circular.insert(identity.clone());
            }

            working.shift_remove(&identity);
            for deps in working.values_mut() {
                deps.shift_remove(&identity);
            }
            sequence.order.push(identity);
        }

        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Dependencies are given as a space-separated list.
    fn edges(list: &[(&str, &str)]) -> Vec<(Identity, DependencySet)> {
        list.iter()
            .map(|(id, deps)| {
                (
                    Identity::new(id),
                    deps.split_whitespace().map(Identity::new).collect(),
                )
            })
            .collect()
    }

    fn order(sequence: &Sequence) -> Vec<&str> {
        sequence.order.iter().map(|i| i.as_str()).collect()
    }

    #[test]
    fn test_already_ordered_input() {
        let seq = Sequencer::new().sequence_edges(edges(&[("A\\Base", ""), ("A\\Child", "A\\Base")]));
        assert_eq!(order(&seq), vec!["A\\Base", "A\\Child"]);
        assert!(seq.circular.is_empty());
        assert_eq!(seq.requeues, 0);
    }

    #[test]
    fn test_child_discovered_first() {
        let seq = Sequencer::new().sequence_edges(edges(&[("A\\Child", "A\\Base"), ("A\\Base", "")]));
        assert_eq!(order(&seq), vec!["A\\Base", "A\\Child"]);
        assert_eq!(seq.requeues, 1);
        assert!(seq.circular.is_empty());
    }

    #[test]
    fn test_mutual_reference_is_circular() {
        let seq = Sequencer::new().sequence_edges(edges(&[("X\\One", "X\\Two"), ("X\\Two", "X\\One")]));

        assert_eq!(order(&seq), vec!["X\\One", "X\\Two"]);
        assert!(seq.is_circular(&Identity::new("X\\One")));
        assert!(seq.is_circular(&Identity::new("X\\Two")));
        assert_eq!(seq.requeues, 6);
    }

    #[test]
    fn test_external_dependencies_do_not_block() {
        let seq = Sequencer::new().sequence_edges(edges(&[("App\\Kernel", "Vendor\\Missing")]));
        assert_eq!(order(&seq), vec!["App\\Kernel"]);
        assert_eq!(seq.requeues, 0);
    }

    #[test]
    fn test_chain_in_reverse_discovery_order() {
        let seq = Sequencer::new().sequence_edges(edges(&[
            ("C", "B"),
            ("B", "A"),
            ("A", ""),
        ]));
        assert_eq!(order(&seq), vec!["A", "B", "C"]);
        assert!(seq.circular.is_empty());
    }

    /// `U0` depends on `U1`, `U1` on `U2`, and so on; discovered dependents first.
    fn reverse_chain(len: usize) -> Vec<(Identity, DependencySet)> {
        (0..len)
            .map(|i| {
                let deps = if i + 1 < len {
                    std::iter::once(Identity::new(format!("U{}", i + 1))).collect()
                } else {
                    DependencySet::default()
                };
                (Identity::new(format!("U{}", i)), deps)
            })
            .collect()
    }

    #[test]
    fn test_four_unit_reverse_chain_stays_ordered() {
        let seq = Sequencer::new().sequence_edges(reverse_chain(4));
        assert_eq!(order(&seq), vec!["U3", "U2", "U1", "U0"]);
        assert_eq!(seq.circular.iter().map(|i| i.as_str()).collect::<Vec<_>>(), vec!["U0"]);
        assert_eq!(seq.requeues, 6);
    }

    #[test]
    fn test_long_reverse_chain_exceeds_budget() {
        let seq = Sequencer::new().sequence_edges(reverse_chain(6));
        assert_eq!(order(&seq), vec!["U5", "U4", "U3", "U0", "U1", "U2"]);
        assert_eq!(
            seq.circular.iter().map(|i| i.as_str()).collect::<Vec<_>>(),
            vec!["U0", "U1", "U2"]
        );
        assert_eq!(seq.requeues, 12);
    }

    #[test]
    fn test_zero_budget_keeps_discovery_order() {
        let seq = Sequencer::new()
            .with_retry_budget(0)
            .sequence_edges(edges(&[("Child", "Base"), ("Base", "")]));
        assert_eq!(order(&seq), vec!["Child", "Base"]);
        assert!(seq.is_circular(&Identity::new("Child")));
        assert!(!seq.is_circular(&Identity::new("Base")));
    }

    #[test]
    fn test_cycle_does_not_block_independent_units() {
        let seq = Sequencer::new().sequence_edges(edges(&[
            ("P", "Q"),
            ("Q", "P"),
            ("Free", ""),
            ("User", "Free"),
        ]));

        assert_eq!(seq.order.len(), 4);
        assert!(seq.position(&Identity::new("Free")) < seq.position(&Identity::new("User")));
        assert!(!seq.is_circular(&Identity::new("Free")));
        assert!(!seq.is_circular(&Identity::new("User")));
        assert!(seq.requeues <= 3 * 4);
    }
}
