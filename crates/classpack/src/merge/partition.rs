//! Grouping of the final sequence into namespace blocks.

use indexmap::IndexMap;

use crate::source::{Identity, Namespace};

/// Sequenced identities grouped by namespace.
///
/// Groups appear in order of their first member; members keep their
/// relative order from the sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceGroups {
    groups: IndexMap<Namespace, Vec<Identity>>,
}

impl NamespaceGroups {
    pub fn partition<'a>(sequence: impl IntoIterator<Item = &'a Identity>) -> Self {
        let mut groups: IndexMap<Namespace, Vec<Identity>> = IndexMap::new();
        for identity in sequence {
            groups
                .entry(identity.namespace())
                .or_default()
                .push(identity.clone());
        }
        Self { groups }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Namespace, &[Identity])> {
        self.groups.iter().map(|(ns, members)| (ns, members.as_slice()))
    }

    pub fn get(&self, namespace: &Namespace) -> Option<&[Identity]> {
        self.groups.get(namespace).map(Vec::as_slice)
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_first_appearance() {
        let seq: Vec<Identity> = ["B\\One", "Root", "A\\Two", "B\\Three", "Other"]
            .iter()
            .map(|s| Identity::new(s))
            .collect();
        let groups = NamespaceGroups::partition(&seq);

        let order: Vec<_> = groups.iter().map(|(ns, _)| ns.clone()).collect();
        assert_eq!(
            order,
            vec![
                Namespace::Named("B".to_string()),
                Namespace::Global,
                Namespace::Named("A".to_string()),
            ]
        );

        let b = groups.get(&Namespace::Named("B".to_string())).unwrap();
        assert_eq!(b, &[Identity::new("B\\One"), Identity::new("B\\Three")]);
        assert_eq!(
            groups.get(&Namespace::Global).unwrap(),
            &[Identity::new("Root"), Identity::new("Other")]
        );
    }
}
