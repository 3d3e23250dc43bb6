//! Classpack Library
//!
//! Merges many single-type PHP source files into one dependency-ordered
//! cache artifact, including:
//! - Unit identification from a bounded header window
//! - Dependency extraction (ancestors, interfaces, `use` aliases)
//! - Cycle-tolerant topological sequencing
//! - Namespace-block merging with alias consolidation and comment stripping
//! - Bundle manifest parsing (classpack.toml)
//! - Atomic cache persistence

pub mod cache;
pub mod error;
pub mod graph;
pub mod introspect;
pub mod loader;
pub mod manifest;
pub mod merge;
pub mod source;

pub use cache::{CacheError, CacheFile};
pub use error::CollectError;
pub use graph::{
    Collision, DeclaredRegistry, DependencyExtractor, DependencyGraph, DependencySet, Discovery,
    Sequence, Sequencer, UnitScanner, DEFAULT_RETRY_BUDGET,
};
pub use introspect::{
    InternalTypes, SourceIntrospector, StaticIntrospector, TypeInfo, TypeIntrospector, TypeRef,
};
pub use loader::{BuildReport, CollectionLoader, LoaderConfig, Outcome, Plan};
pub use manifest::{find_manifest, BundleManifest, ManifestError, MANIFEST_FILE};
pub use merge::{MergeEmitter, MergedDocument, NamespaceGroups, SourceRewriter};
pub use source::{EntryWalker, FsWalker, Identity, Namespace, SourceUnit, UnitIdentifier};
