//! Merged document assembly.

use std::fmt::Write as _;

use tracing::debug;

use super::partition::NamespaceGroups;
use super::rewrite::{AliasLedger, SourceRewriter};
use crate::graph::{DependencyGraph, Sequence};
use crate::source::Namespace;

/// Header every artifact starts with.
pub const DOCUMENT_HEADER: &str = "<?php\n";

/// One namespace block of the merged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub namespace: Namespace,
    /// Rewritten member bodies in sequence order
    pub bodies: Vec<String>,
}

/// The terminal artifact: ordered namespace blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedDocument {
    pub blocks: Vec<Block>,
}

impl MergedDocument {
    pub fn render(&self) -> String {
        let mut out = String::from(DOCUMENT_HEADER);
        for block in &self.blocks {
            match &block.namespace {
                Namespace::Global => out.push_str("\nnamespace {\n"),
                Namespace::Named(name) => {
                    let _ = write!(out, "\nnamespace {} {{\n", name);
                }
            }
            out.push_str(&block.bodies.join("\n"));
            out.push_str("\n}\n\n");
        }
        out
    }

    pub fn unit_count(&self) -> usize {
        self.blocks.iter().map(|b| b.bodies.len()).sum()
    }
}

/// Builds a [`MergedDocument`] from a sequenced graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEmitter {
    rewriter: SourceRewriter,
}

impl MergeEmitter {
    pub fn new(rewriter: SourceRewriter) -> Self {
        Self { rewriter }
    }

    pub fn emit(&self, graph: &DependencyGraph, sequence: &Sequence) -> MergedDocument {
        let groups = NamespaceGroups::partition(&sequence.order);
        let mut document = MergedDocument::default();

        for (namespace, members) in groups.iter() {
            let mut ledger = AliasLedger::new(namespace.clone());
            let bodies: Vec<String> = members
                .iter()
                .filter_map(|identity| {
                    let unit = graph.unit(identity)?;
                    Some(self.rewriter.rewrite(unit, &mut ledger, sequence.is_circular(identity)))
                })
                .collect();

            debug!(%namespace, members = bodies.len(), "emitted block");
            document.blocks.push(Block {
                namespace: namespace.clone(),
                bodies,
            });
        }

        document
    }
}
