//! Source units and the identities they declare.

use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

/// Separator between namespace segments.
pub const SEPARATOR: char = '\\';

/// Fully-qualified name of a declared type, without a leading separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Create an identity, dropping any leading separators and surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().trim_start_matches(SEPARATOR).to_string())
    }

    /// Join a namespace prefix and a local name.
    pub fn qualified(prefix: &str, local: &str) -> Self {
        let prefix = prefix.trim().trim_matches(SEPARATOR);
        if prefix.is_empty() {
            Self::new(local)
        } else {
            Self::new(format!("{}{}{}", prefix, SEPARATOR, local.trim()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the final segment.
    pub fn namespace(&self) -> Namespace {
        match self.0.rfind(SEPARATOR) {
            Some(pos) => Namespace::Named(self.0[..pos].to_string()),
            None => Namespace::Global,
        }
    }

    /// The final segment.
    pub fn local_name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(pos) => &self.0[pos + 1..],
            None => &self.0,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Identity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Namespace a unit is declared in.
///
/// Units without a namespace declaration live in the global namespace,
/// which is emitted as an anonymous block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Namespace {
    Global,
    Named(String),
}

impl Namespace {
    /// Namespace from a declaration prefix; an empty prefix is global.
    pub fn from_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim().trim_matches(SEPARATOR);
        if prefix.is_empty() {
            Namespace::Global
        } else {
            Namespace::Named(prefix.to_string())
        }
    }

    /// Name as written in a block header (empty for the global namespace).
    pub fn as_str(&self) -> &str {
        match self {
            Namespace::Global => "",
            Namespace::Named(name) => name,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Namespace::Global)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Global => f.write_str("(global)"),
            Namespace::Named(name) => f.write_str(name),
        }
    }
}

/// One discovered file declaring exactly one class or interface.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Declared identity (unique across the run)
    pub identity: Identity,
    /// File the unit was read from
    pub origin: PathBuf,
    /// Whole file contents
    pub text: String,
}

impl SourceUnit {
    pub fn new(identity: Identity, origin: PathBuf, text: String) -> Self {
        Self {
            identity,
            origin,
            text,
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.identity.namespace()
    }
}
