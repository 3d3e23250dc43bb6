//! Per-unit source rewriting
//!
//! Turns one file's text into a body that can sit inside a merged
//! namespace block:
//! 1. the unit's own `namespace X;` line is removed
//! 2. alias statements are consolidated against the block's ledger
//! 3. `<?php` / `?>` file delimiters are removed
//! 4. comments are stripped (optional)
//! 5. circular units are wrapped in a conditional-inclusion guard

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::source::grammar::{self, AliasMember, AliasStatement, ALIAS_STMT, NAMESPACE_LINE};
use crate::source::lexer;
use crate::source::{Identity, Namespace, SourceUnit};

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A\s*<\?php").unwrap());
static CLOSE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?>\s*\z").unwrap());

/// Alias members already emitted in one namespace block.
///
/// Create a fresh ledger for every block.
#[derive(Debug, Clone)]
pub struct AliasLedger {
    namespace: Namespace,
    emitted: IndexSet<String>,
    bindings: FxHashMap<String, String>,
}

impl AliasLedger {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            emitted: IndexSet::new(),
            bindings: FxHashMap::default(),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Members emitted so far, in order.
    pub fn emitted(&self) -> impl Iterator<Item = &str> {
        self.emitted.iter().map(String::as_str)
    }

    /// Record `member` if it should be emitted here.
    ///
    /// Rejects members from the block's own namespace and members already
    /// emitted in this block.
    pub fn admit(&mut self, member: &AliasMember) -> bool {
        if member.is_within(&self.namespace) {
            return false;
        }

        let key = member.dedup_key();
        if self.emitted.contains(&key) {
            return false;
        }

        for binding in &member.bindings {
            let short = binding.to_ascii_lowercase();
            match self.bindings.get(&short) {
                Some(existing) if *existing != key => {
                    warn!(
                        namespace = %self.namespace,
                        name = %binding,
                        first = %existing,
                        second = %key,
                        "two aliases bind the same name in one block"
                    );
                }
                Some(_) => {}
                None => {
                    self.bindings.insert(short, key.clone());
                }
            }
        }

        self.emitted.insert(key);
        true
    }
}

/// Rewrites unit bodies for merging.
#[derive(Debug, Clone, Copy)]
pub struct SourceRewriter {
    strip_comments: bool,
}

impl Default for SourceRewriter {
    fn default() -> Self {
        Self {
            strip_comments: true,
        }
    }
}

impl SourceRewriter {
    pub fn new(strip_comments: bool) -> Self {
        Self { strip_comments }
    }

    /// Rewrite `unit` for the block tracked by `ledger`.
    pub fn rewrite(&self, unit: &SourceUnit, ledger: &mut AliasLedger, circular: bool) -> String {
        let text = replace_in_code(&NAMESPACE_LINE, &unit.text, |_| String::new());
        let text = consolidate_aliases(&text, ledger);
        let text = strip_delimiters(&text);

        let text = if self.strip_comments {
            lexer::strip_comments(&text)
        } else {
            text
        };

        let body = text.trim();
        if circular {
            guard(body, &unit.identity)
        } else {
            body.to_string()
        }
    }
}

/// Replace every alias statement with one holding only admitted members.
///
/// Statements inside comments and string literals are left alone.
pub fn consolidate_aliases(text: &str, ledger: &mut AliasLedger) -> String {
    replace_in_code(&ALIAS_STMT, text, |caps| {
        let stmt = AliasStatement::parse(&caps[1]);
        let survivors: Vec<&AliasMember> =
            stmt.members.iter().filter(|m| ledger.admit(m)).collect();
        if survivors.is_empty() {
            String::new()
        } else {
            AliasStatement::render(stmt.kind, &survivors)
        }
    })
}

/// `Regex::replace_all` restricted to matches that start in code.
fn replace_in_code<F>(re: &Regex, text: &str, mut replacement: F) -> String
where
    F: FnMut(&Captures<'_>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in grammar::code_captures(re, text) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&text[last..m.start()]);
        out.push_str(&replacement(&caps));
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

fn strip_delimiters(text: &str) -> String {
    let text = OPEN_TAG.replace(text, "");
    CLOSE_TAG.replace(&text, "").into_owned()
}

/// Wrap `body` so it only takes effect when `identity` is not yet defined.
///
/// The guard opens after the last alias statement, since aliases must stay
/// at the top level of the block.
pub fn guard(body: &str, identity: &Identity) -> String {
    let open = format!(
        "if (!class_exists('\\{0}', false) && !interface_exists('\\{0}', false)) {{\n",
        identity
    );

    let last_alias = grammar::code_captures(&ALIAS_STMT, body)
        .last()
        .and_then(|caps| caps.get(0));
    match last_alias {
        Some(last) => {
            let (head, tail) = body.split_at(last.end());
            format!("{}\n{}{}\n}}\n", head, open, tail.trim_start_matches(|c| c == '\r' || c == '\n'))
        }
        None => format!("\n{}{}\n}}\n", open, body),
    }
}
