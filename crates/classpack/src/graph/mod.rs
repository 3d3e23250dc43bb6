//! Dependency graph
//!
//! - **declared**: snapshot of identities known before the run
//! - **extract**: per-unit dependency sets (ancestors, interfaces, aliases)
//! - **builder**: discovery over source roots and graph assembly
//! - **sequencer**: cycle-tolerant topological ordering

mod builder;
mod declared;
mod extract;
mod sequencer;

pub use builder::{Collision, DependencyGraph, Discovery, UnitScanner};
pub use declared::DeclaredRegistry;
pub use extract::{DependencyExtractor, DependencySet};
pub use sequencer::{Sequence, Sequencer, DEFAULT_RETRY_BUDGET};
