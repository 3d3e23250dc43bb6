//! Line-level recognizers for the constructs the bundler cares about.
//!
//! Accepted grammar (all keywords case-insensitive, anchored at column 0):
//!
//! ```text
//! namespace_decl := "namespace" WS name WS? ";"
//! type_header    := ( ("abstract" | "final") WS )? ("class" | "interface") WS ident tail "{"
//! tail           := ( "extends" name_list )? ( "implements" name_list )?
//! alias_stmt     := "use" WS ( ("function" | "const") WS )? clause ";"
//! clause         := member ( "," member )*          -- may span lines
//!                 | prefix "\{" member ( "," member )* "}"
//! member         := name ( WS "as" WS ident )?
//! ```
//!
//! Indented `use` lines are trait imports inside class bodies and are not
//! matched. Bracketed `namespace X { ... }` syntax is not recognized.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::lexer;
use super::unit::{Identity, Namespace};

pub static NAMESPACE_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^namespace[ \t]+([^;\s{]+)[ \t]*;").unwrap());

/// Namespace declaration line including its line break, for removal.
pub static NAMESPACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^namespace[ \t]+[^;\s{]+[ \t]*;[ \t]*\r?\n?").unwrap());

pub static TYPE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^(?:(?:abstract|final)[ \t]+)?(class|interface)[ \t]+([\p{L}_][\w]*)").unwrap()
});

/// Header with its inheritance tail, up to the opening brace.
pub static TYPE_HEADER_FULL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^(?:(?:abstract|final)[ \t]+)?(class|interface)[ \t]+([\p{L}_][\w]*)([^{;]*)\{")
        .unwrap()
});

pub static ALIAS_STMT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?mi)^use\s+([^;]+);").unwrap());

static HEADER_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(extends|implements)\b").unwrap());

static MEMBER_ALIAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(.+?)\s+as\s+([\p{L}_][\w]*)$").unwrap());

/// Declared kind of a recognized type header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

/// A parsed `class` / `interface` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeHeader {
    pub kind: TypeKind,
    pub name: String,
    /// Names after `extends`, as written
    pub extends: Vec<String>,
    /// Names after `implements`, as written
    pub implements: Vec<String>,
}

/// First namespace declaration in `text`, if any.
pub fn namespace_prefix(text: &str) -> Option<&str> {
    NAMESPACE_DECL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Local name of the first type header in `text`.
pub fn declared_name(text: &str) -> Option<&str> {
    TYPE_HEADER
        .captures(text)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
}

/// Parse the first complete type header in `text`.
pub fn type_header(text: &str) -> Option<TypeHeader> {
    let caps = TYPE_HEADER_FULL.captures(text)?;
    let kind = if caps[1].eq_ignore_ascii_case("interface") {
        TypeKind::Interface
    } else {
        TypeKind::Class
    };

    let tail = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
    let mut extends = Vec::new();
    let mut implements = Vec::new();

    let keywords: Vec<_> = HEADER_KEYWORD.captures_iter(tail).collect();
    for (i, kw) in keywords.iter().enumerate() {
        let whole = kw.get(0).map(|m| m.end()).unwrap_or_default();
        let end = keywords
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(tail.len());
        let names = split_names(&tail[whole..end]);
        if kw[1].eq_ignore_ascii_case("extends") {
            extends.extend(names);
        } else {
            implements.extend(names);
        }
    }

    Some(TypeHeader {
        kind,
        name: caps[2].to_string(),
        extends,
        implements,
    })
}

fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// What an alias statement imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportKind {
    Type,
    Function,
    Const,
}

impl ImportKind {
    fn keyword(self) -> &'static str {
        match self {
            ImportKind::Type => "",
            ImportKind::Function => "function ",
            ImportKind::Const => "const ",
        }
    }
}

/// One member of an alias statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMember {
    pub kind: ImportKind,
    /// Normalized member text, e.g. `Foo\Bar as Baz` or `Foo\{A, B}`
    pub text: String,
    /// Referenced names (several for a group import)
    pub targets: Vec<Identity>,
    /// Short names this member binds in the importing scope
    pub bindings: Vec<String>,
}

impl AliasMember {
    /// True when every target lives in `namespace`.
    pub fn is_within(&self, namespace: &Namespace) -> bool {
        !self.targets.is_empty() && self.targets.iter().all(|t| &t.namespace() == namespace)
    }

    /// Key used to deduplicate members within one block.
    pub fn dedup_key(&self) -> String {
        format!("{}{}", self.kind.keyword(), self.text)
    }
}

/// A parsed `use` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasStatement {
    pub kind: ImportKind,
    pub members: Vec<AliasMember>,
}

impl AliasStatement {
    /// Parse the clause captured between `use` and `;`.
    pub fn parse(clause: &str) -> Self {
        let clause = normalize_whitespace(clause);
        let (kind, rest) = split_kind(&clause);

        let members = if let Some(open) = rest.find('{') {
            parse_group(kind, rest, open).into_iter().collect()
        } else {
            rest.split(',')
                .filter_map(|part| parse_member(kind, part))
                .collect()
        };

        Self { kind, members }
    }

    /// Render a consolidated statement from surviving members.
    pub fn render(kind: ImportKind, members: &[&AliasMember]) -> String {
        let list: Vec<&str> = members.iter().map(|m| m.text.as_str()).collect();
        format!("use {}{};", kind.keyword(), list.join(", "))
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_kind(clause: &str) -> (ImportKind, &str) {
    let lower = clause.to_ascii_lowercase();
    if lower.starts_with("function ") {
        (ImportKind::Function, clause["function ".len()..].trim_start())
    } else if lower.starts_with("const ") {
        (ImportKind::Const, clause["const ".len()..].trim_start())
    } else {
        (ImportKind::Type, clause)
    }
}

fn parse_member(kind: ImportKind, part: &str) -> Option<AliasMember> {
    let part = part.trim();
    if part.is_empty() {
        return None;
    }

    let (target, alias) = match MEMBER_ALIAS.captures(part) {
        Some(caps) => (caps[1].trim().to_string(), Some(caps[2].to_string())),
        None => (part.to_string(), None),
    };
    let target = Identity::new(&target);
    let binding = alias
        .clone()
        .unwrap_or_else(|| target.local_name().to_string());
    let text = match &alias {
        Some(alias) => format!("{} as {}", target, alias),
        None => target.to_string(),
    };

    Some(AliasMember {
        kind,
        text,
        targets: vec![target],
        bindings: vec![binding],
    })
}

fn parse_group(kind: ImportKind, rest: &str, open: usize) -> Option<AliasMember> {
    let prefix = rest[..open].trim().trim_end_matches('\\');
    let close = rest.rfind('}').unwrap_or(rest.len());
    if close <= open {
        return None;
    }

    let mut targets = Vec::new();
    let mut bindings = Vec::new();
    for inner in rest[open + 1..close].split(',') {
        if let Some(member) = parse_member(kind, inner) {
            for target in member.targets {
                targets.push(Identity::qualified(prefix, target.as_str()));
            }
            bindings.extend(member.bindings);
        }
    }

    Some(AliasMember {
        kind,
        text: rest.trim().trim_start_matches('\\').to_string(),
        targets,
        bindings,
    })
}

/// Matches of `re` that start in code, outside comments and string literals.
pub fn code_captures<'t>(re: &Regex, text: &'t str) -> Vec<Captures<'t>> {
    let opaque = lexer::opaque_spans(text);
    re.captures_iter(text)
        .filter(|caps| {
            caps.get(0)
                .map_or(false, |m| !lexer::is_opaque(&opaque, m.start()))
        })
        .collect()
}

/// Every alias statement in the code of `text`, in source order.
pub fn alias_statements(text: &str) -> Vec<AliasStatement> {
    code_captures(&ALIAS_STMT, text)
        .iter()
        .map(|caps| AliasStatement::parse(&caps[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_prefix() {
        let src = "<?php\nnamespace lib\\loader;\n\nclass Collection {}\n";
        assert_eq!(namespace_prefix(src), Some("lib\\loader"));
        assert_eq!(namespace_prefix("<?php\nclass A {}"), None);
    }

    #[test]
    fn test_declared_name_with_qualifiers() {
        assert_eq!(declared_name("abstract class Base\n{"), Some("Base"));
        assert_eq!(declared_name("final class Leaf extends Base {"), Some("Leaf"));
        assert_eq!(declared_name("INTERFACE Shape {"), Some("Shape"));
        assert_eq!(declared_name("    class Indented {}"), None);
        assert_eq!(declared_name("$x = new class {};"), None);
    }

    #[test]
    fn test_type_header_inheritance() {
        let header =
            type_header("class Child extends \\A\\Base implements Countable, Lib\\Shape\n{").unwrap();
        assert_eq!(header.kind, TypeKind::Class);
        assert_eq!(header.name, "Child");
        assert_eq!(header.extends, vec!["\\A\\Base"]);
        assert_eq!(header.implements, vec!["Countable", "Lib\\Shape"]);
    }

    #[test]
    fn test_interface_header_extends_list() {
        let header = type_header("interface Stack extends Countable, Pushable {").unwrap();
        assert_eq!(header.kind, TypeKind::Interface);
        assert_eq!(header.extends, vec!["Countable", "Pushable"]);
        assert!(header.implements.is_empty());
    }

    #[test]
    fn test_alias_statement_multiline_list() {
        let src = "use A\\One,\n    \\B\\Two as Second;\n";
        let stmts = alias_statements(src);
        assert_eq!(stmts.len(), 1);
        let members = &stmts[0].members;
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].text, "A\\One");
        assert_eq!(members[1].text, "B\\Two as Second");
        assert_eq!(members[1].targets, vec![Identity::new("B\\Two")]);
        assert_eq!(members[1].bindings, vec!["Second".to_string()]);
    }

    #[test]
    fn test_alias_statement_function_kind() {
        let stmt = AliasStatement::parse("function Util\\helper");
        assert_eq!(stmt.kind, ImportKind::Function);
        assert_eq!(stmt.members[0].dedup_key(), "function Util\\helper");
        assert_eq!(AliasStatement::render(stmt.kind, &[&stmt.members[0]]), "use function Util\\helper;");
    }

    #[test]
    fn test_group_alias() {
        let stmt = AliasStatement::parse("App\\Model\\{User, Group as Team}");
        assert_eq!(stmt.members.len(), 1);
        let member = &stmt.members[0];
        assert_eq!(
            member.targets,
            vec![Identity::new("App\\Model\\User"), Identity::new("App\\Model\\Group")]
        );
        assert_eq!(member.bindings, vec!["User".to_string(), "Team".to_string()]);
        assert!(member.is_within(&Namespace::Named("App\\Model".to_string())));
    }

    #[test]
    fn test_commented_and_quoted_use_ignored() {
        let src = "<?php\n/*\nuse Old\\Log;\n*/\n$doc = <<<EOT\nuse Doc\\Sample;\nEOT;\nuse Lib\\Log;\n";
        let stmts = alias_statements(src);
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].members[0].text, "Lib\\Log");
    }

    #[test]
    fn test_indented_use_is_not_alias() {
        let src = "class A {\n    use SomeTrait;\n}\n";
        assert!(alias_statements(src).is_empty());
    }
}
