//! Dependency graph construction
//!
//! Discovery walks every root, identifies units and reads their text;
//! graph building then runs extraction for each discovered unit.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::declared::DeclaredRegistry;
use super::extract::{DependencyExtractor, DependencySet};
use crate::error::CollectError;
use crate::source::{EntryWalker, Identity, SourceUnit, UnitIdentifier};

/// Two roots declared the same identity; the later file replaced the earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub identity: Identity,
    pub kept: PathBuf,
    pub replaced: PathBuf,
}

/// Units found under the configured roots, in discovery order.
#[derive(Debug, Default)]
pub struct Discovery {
    pub units: IndexMap<Identity, SourceUnit>,
    pub collisions: Vec<Collision>,
}

impl Discovery {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.units.values()
    }
}

/// Walks roots and collects identifiable units.
pub struct UnitScanner<'a> {
    identifier: &'a UnitIdentifier,
    walker: &'a dyn EntryWalker,
    declared: &'a DeclaredRegistry,
}

impl<'a> UnitScanner<'a> {
    pub fn new(
        identifier: &'a UnitIdentifier,
        walker: &'a dyn EntryWalker,
        declared: &'a DeclaredRegistry,
    ) -> Self {
        Self {
            identifier,
            walker,
            declared,
        }
    }

    /// Discover units under every root.
    ///
    /// Missing roots contribute nothing. A file that was identified but
    /// cannot be read aborts discovery.
    pub fn scan(&self, roots: &[PathBuf]) -> Result<Discovery, CollectError> {
        let mut discovery = Discovery::default();

        for root in roots {
            if !root.is_dir() {
                warn!(root = %root.display(), "source root missing or not a directory, skipping");
                continue;
            }

            for entry in self.walker.walk(root) {
                let Some(identity) = self.identifier.identify(&entry)? else {
                    continue;
                };
                if self.declared.contains(&identity) {
                    debug!(%identity, "already declared, skipping");
                    continue;
                }

                let unit = SourceUnit::new(identity.clone(), entry.clone(), read_source(&entry)?);
                debug!(%identity, path = %entry.display(), "discovered unit");

                if let Some(previous) = discovery.units.insert(identity.clone(), unit) {
                    warn!(
                        %identity,
                        kept = %entry.display(),
                        replaced = %previous.origin.display(),
                        "identity declared twice, later file wins"
                    );
                    discovery.collisions.push(Collision {
                        identity,
                        kept: entry,
                        replaced: previous.origin,
                    });
                }
            }
        }

        Ok(discovery)
    }
}

fn read_source(path: &Path) -> Result<String, CollectError> {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|source| CollectError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Every discovered unit with its dependency set.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    units: IndexMap<Identity, SourceUnit>,
    deps: IndexMap<Identity, DependencySet>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run extraction for every discovered unit.
    pub fn build(discovery: Discovery, extractor: &DependencyExtractor<'_>) -> Self {
        let mut graph = Self::new();
        for (_, unit) in discovery.units {
            let deps = extractor.extract(&unit);
            graph.insert(unit, deps);
        }
        graph
    }

    /// Record a unit; a unit with the same identity is replaced in place.
    pub fn insert(&mut self, unit: SourceUnit, deps: DependencySet) -> Option<SourceUnit> {
        self.deps.insert(unit.identity.clone(), deps);
        self.units.insert(unit.identity.clone(), unit)
    }

    pub fn unit(&self, identity: &Identity) -> Option<&SourceUnit> {
        self.units.get(identity)
    }

    pub fn dependencies(&self, identity: &Identity) -> Option<&DependencySet> {
        self.deps.get(identity)
    }

    /// Identities in discovery order.
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.units.keys()
    }

    /// (identity, dependencies) pairs in discovery order.
    pub fn edges(&self) -> impl Iterator<Item = (&Identity, &DependencySet)> {
        self.deps.iter()
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.units.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
