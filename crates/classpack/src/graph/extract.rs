//! Per-unit dependency extraction
//!
//! A unit depends on, in discovery order:
//! 1. every ancestor class, walked until an internal, declared or already
//!    visited one, plus each visited ancestor's direct interfaces
//! 2. its own direct interfaces
//! 3. every type named in its alias statements

use indexmap::IndexSet;

use super::declared::DeclaredRegistry;
use crate::introspect::{TypeIntrospector, TypeRef};
use crate::source::grammar::{self, ImportKind};
use crate::source::{Identity, SourceUnit};

/// Insertion-ordered dependency set of one unit.
pub type DependencySet = IndexSet<Identity>;

/// Computes dependency sets using an introspection collaborator.
pub struct DependencyExtractor<'a> {
    introspector: &'a dyn TypeIntrospector,
    declared: &'a DeclaredRegistry,
}

impl<'a> DependencyExtractor<'a> {
    pub fn new(introspector: &'a dyn TypeIntrospector, declared: &'a DeclaredRegistry) -> Self {
        Self {
            introspector,
            declared,
        }
    }

    /// Dependency set of `unit`, without duplicates and without the unit itself.
    pub fn extract(&self, unit: &SourceUnit) -> DependencySet {
        let mut deps = DependencySet::new();
        self.gather_ancestors(&unit.identity, &mut deps);

        if let Some(info) = self.introspector.inspect(&unit.identity) {
            self.gather_interfaces(&info.interfaces, &mut deps);
        }

        self.gather_aliases(&unit.text, &mut deps);
        deps.shift_remove(&unit.identity);
        deps
    }

    fn gather_ancestors(&self, identity: &Identity, deps: &mut DependencySet) {
        let mut node = identity.clone();
        while let Some(parent) = self.introspector.inspect(&node).and_then(|info| info.parent) {
            if parent.internal
                || self.declared.contains(&parent.identity)
                || deps.contains(&parent.identity)
                || parent.identity == *identity
            {
                break;
            }

            deps.insert(parent.identity.clone());
            if let Some(parent_info) = self.introspector.inspect(&parent.identity) {
                self.gather_interfaces(&parent_info.interfaces, deps);
            }
            node = parent.identity;
        }
    }

    fn gather_interfaces(&self, interfaces: &[TypeRef], deps: &mut DependencySet) {
        for interface in interfaces {
            if interface.internal || self.declared.contains(&interface.identity) {
                continue;
            }
            deps.insert(interface.identity.clone());
        }
    }

    fn gather_aliases(&self, text: &str, deps: &mut DependencySet) {
        for stmt in grammar::alias_statements(text) {
            if stmt.kind != ImportKind::Type {
                continue;
            }
            for member in stmt.members {
                for target in member.targets {
                    if !self.declared.contains(&target) {
                        deps.insert(target);
                    }
                }
            }
        }
    }
}
