//! Type introspection
//!
//! The dependency extractor only needs one capability: given an identity,
//! report its direct parent and directly declared interfaces, flagging the
//! ones provided by the runtime itself. [`TypeIntrospector`] is that seam.
//!
//! Two collaborators are provided:
//! - [`SourceIntrospector`] answers from the discovered units' own
//!   declaration headers, resolving names the way the runtime would
//! - [`StaticIntrospector`] is a plain lookup table for embedding and tests

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::source::grammar::{self, ImportKind, TypeKind};
use crate::source::{Identity, SourceUnit, SEPARATOR};

/// Reference to a type, flagged when the runtime provides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub identity: Identity,
    pub internal: bool,
}

impl TypeRef {
    pub fn user(identity: impl Into<Identity>) -> Self {
        Self {
            identity: identity.into(),
            internal: false,
        }
    }

    pub fn internal(identity: impl Into<Identity>) -> Self {
        Self {
            identity: identity.into(),
            internal: true,
        }
    }
}

/// Direct inheritance facts for one type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeInfo {
    pub parent: Option<TypeRef>,
    /// Directly declared interfaces (not inherited ones)
    pub interfaces: Vec<TypeRef>,
}

/// Answers inheritance queries about identities.
pub trait TypeIntrospector {
    /// Inheritance facts for `identity`, or `None` when it is unknown.
    fn inspect(&self, identity: &Identity) -> Option<TypeInfo>;
}

/// Types the PHP runtime provides without any user source.
pub const BUILTIN_TYPES: &[&str] = &[
    "ArgumentCountError",
    "ArithmeticError",
    "ArrayAccess",
    "ArrayIterator",
    "ArrayObject",
    "BackedEnum",
    "BadFunctionCallException",
    "BadMethodCallException",
    "Closure",
    "Countable",
    "DateTime",
    "DateTimeImmutable",
    "DateTimeInterface",
    "DivisionByZeroError",
    "DomainException",
    "Error",
    "ErrorException",
    "Exception",
    "FilterIterator",
    "Generator",
    "InvalidArgumentException",
    "Iterator",
    "IteratorAggregate",
    "JsonException",
    "JsonSerializable",
    "LengthException",
    "LogicException",
    "OutOfBoundsException",
    "OutOfRangeException",
    "OverflowException",
    "RangeException",
    "RecursiveIterator",
    "RuntimeException",
    "Serializable",
    "SplObjectStorage",
    "SplObserver",
    "SplSubject",
    "Stringable",
    "Throwable",
    "Traversable",
    "TypeError",
    "UnderflowException",
    "UnexpectedValueException",
    "UnitEnum",
    "ValueError",
    "stdClass",
];

/// Case-insensitive set of runtime-internal type names.
#[derive(Debug, Clone, Default)]
pub struct InternalTypes {
    names: FxHashSet<String>,
}

impl InternalTypes {
    /// The builtin list plus `extra`.
    pub fn with_builtins<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut types = Self::default();
        for name in BUILTIN_TYPES {
            types.insert(name);
        }
        for name in extra {
            types.insert(name.as_ref());
        }
        types
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(Identity::new(name).as_str().to_ascii_lowercase());
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.names.contains(&identity.as_str().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone)]
struct DeclaredShape {
    parent: Option<Identity>,
    interfaces: Vec<Identity>,
}

/// Introspection backed by the declaration headers of discovered units.
#[derive(Debug, Clone, Default)]
pub struct SourceIntrospector {
    shapes: FxHashMap<Identity, DeclaredShape>,
    internal: InternalTypes,
}

impl SourceIntrospector {
    pub fn new(internal: InternalTypes) -> Self {
        Self {
            shapes: FxHashMap::default(),
            internal,
        }
    }

    /// Index every unit whose header can be parsed.
    pub fn from_units<'a>(
        units: impl IntoIterator<Item = &'a SourceUnit>,
        internal: InternalTypes,
    ) -> Self {
        let mut introspector = Self::new(internal);
        for unit in units {
            introspector.add_unit(unit);
        }
        introspector
    }

    /// Index one unit, replacing an earlier unit with the same identity.
    pub fn add_unit(&mut self, unit: &SourceUnit) {
        let Some(header) = grammar::type_header(&unit.text) else {
            return;
        };
        let scope = NameScope::for_unit(unit);

        let shape = match header.kind {
            TypeKind::Class => DeclaredShape {
                parent: header.extends.first().map(|name| scope.resolve(name)),
                interfaces: header.implements.iter().map(|n| scope.resolve(n)).collect(),
            },
            TypeKind::Interface => DeclaredShape {
                parent: None,
                interfaces: header.extends.iter().map(|n| scope.resolve(n)).collect(),
            },
        };

        self.shapes.insert(unit.identity.clone(), shape);
    }

    fn type_ref(&self, identity: &Identity) -> TypeRef {
        TypeRef {
            identity: identity.clone(),
            internal: self.internal.contains(identity),
        }
    }
}

impl TypeIntrospector for SourceIntrospector {
    fn inspect(&self, identity: &Identity) -> Option<TypeInfo> {
        let shape = self.shapes.get(identity)?;
        Some(TypeInfo {
            parent: shape.parent.as_ref().map(|p| self.type_ref(p)),
            interfaces: shape.interfaces.iter().map(|i| self.type_ref(i)).collect(),
        })
    }
}

/// Name resolution context of one file: its namespace and type aliases.
struct NameScope {
    prefix: String,
    aliases: FxHashMap<String, Identity>,
}

impl NameScope {
    fn for_unit(unit: &SourceUnit) -> Self {
        let mut aliases = FxHashMap::default();
        for stmt in grammar::alias_statements(&unit.text) {
            if stmt.kind != ImportKind::Type {
                continue;
            }
            for member in stmt.members {
                for (binding, target) in member.bindings.iter().zip(member.targets.iter()) {
                    aliases.insert(binding.to_ascii_lowercase(), target.clone());
                }
            }
        }

        Self {
            prefix: unit.namespace().as_str().to_string(),
            aliases,
        }
    }

    /// Resolve a name as written in a header to a fully-qualified identity.
    fn resolve(&self, name: &str) -> Identity {
        let name = name.trim();
        if name.starts_with(SEPARATOR) {
            return Identity::new(name);
        }
        if let Some(rest) = name.strip_prefix("namespace\\") {
            return Identity::qualified(&self.prefix, rest);
        }

        let (head, tail) = match name.find(SEPARATOR) {
            Some(pos) => (&name[..pos], Some(&name[pos + 1..])),
            None => (name, None),
        };

        match (self.aliases.get(&head.to_ascii_lowercase()), tail) {
            (Some(target), Some(tail)) => Identity::qualified(target.as_str(), tail),
            (Some(target), None) => target.clone(),
            (None, _) => Identity::qualified(&self.prefix, name),
        }
    }
}

/// Lookup-table introspection.
#[derive(Debug, Clone, Default)]
pub struct StaticIntrospector {
    types: IndexMap<Identity, TypeInfo>,
}

impl StaticIntrospector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register facts for one identity.
    pub fn with_type(mut self, identity: impl Into<Identity>, info: TypeInfo) -> Self {
        self.insert(identity, info);
        self
    }

    pub fn insert(&mut self, identity: impl Into<Identity>, info: TypeInfo) {
        self.types.insert(identity.into(), info);
    }
}

impl TypeIntrospector for StaticIntrospector {
    fn inspect(&self, identity: &Identity) -> Option<TypeInfo> {
        self.types.get(identity).cloned()
    }
}
