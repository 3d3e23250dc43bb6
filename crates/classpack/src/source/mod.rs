//! Source discovery
//!
//! - **unit**: identities, namespaces and discovered source units
//! - **grammar**: recognizers for namespace, header and alias lines
//! - **lexer**: comment- and literal-aware tokenizer
//! - **identifier**: bounded-window identification of candidate files
//! - **walk**: recursive enumeration of source roots

pub mod grammar;
pub mod identifier;
pub mod lexer;
pub mod unit;
pub mod walk;

pub use identifier::{identify_text, UnitIdentifier, HEADER_WINDOW};
pub use unit::{Identity, Namespace, SourceUnit, SEPARATOR};
pub use walk::{EntryWalker, FsWalker};
