//! Merge engine
//!
//! - **partition**: groups the final sequence by namespace
//! - **rewrite**: per-unit body rewriting and alias consolidation
//! - **emit**: assembles blocks into the merged document

mod emit;
mod partition;
mod rewrite;

pub use emit::{Block, MergeEmitter, MergedDocument, DOCUMENT_HEADER};
pub use crate::source::lexer::strip_comments;
pub use partition::NamespaceGroups;
pub use rewrite::{consolidate_aliases, guard, AliasLedger, SourceRewriter};
