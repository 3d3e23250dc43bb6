//! Identities the host already knows before a run.

use rustc_hash::FxHashSet;

use crate::source::Identity;

/// Immutable snapshot of already-declared identities.
///
/// Captured once when the loader is constructed. Discovered units with one
/// of these identities are skipped, and references to them never become
/// dependencies.
#[derive(Debug, Clone, Default)]
pub struct DeclaredRegistry {
    names: FxHashSet<Identity>,
}

impl DeclaredRegistry {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names.into_iter().map(|n| Identity::new(n.as_ref())).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.names.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_normalized() {
        let declared = DeclaredRegistry::new(["\\Vendor\\Preloaded", "Other"]);
        assert!(declared.contains(&Identity::new("Vendor\\Preloaded")));
        assert!(declared.contains(&Identity::new("Other")));
        assert_eq!(declared.len(), 2);
        assert!(DeclaredRegistry::empty().is_empty());
    }
}
