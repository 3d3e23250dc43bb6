//! Comment-aware tokenizer for PHP source.
//!
//! Only distinguishes what comment stripping needs: comments, string
//! literals (so comment markers inside them survive), whitespace, and
//! everything else.

use std::cmp::Ordering;
use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[token("//", lex_line_comment)]
    #[token("#", lex_line_comment)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    #[regex(r"'([^'\\]|\\(.|\n))*'")]
    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    Str,

    #[token("<<<", lex_heredoc)]
    Heredoc,

    #[token("#[")]
    #[token("/")]
    #[token("<")]
    #[regex(r#"[^ \t\r\n'"/#<]+"#)]
    Code,
}

/// Consume up to (not including) the line break or a closing tag.
fn lex_line_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let remainder = lex.remainder();
    let end = [remainder.find('\n'), remainder.find("?>")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(remainder.len());
    lex.bump(end);
    true
}

fn lex_block_comment(lex: &mut logos::Lexer<RawToken>) -> bool {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(remainder.len()),
    }
    true
}

/// Heredoc / nowdoc: `<<<ID`, `<<<"ID"` or `<<<'ID'` up to a line whose
/// first non-blank text is the identifier.
fn lex_heredoc(lex: &mut logos::Lexer<RawToken>) -> bool {
    let remainder = lex.remainder();
    let Some(line_end) = remainder.find('\n') else {
        return false;
    };

    let label = remainder[..line_end]
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    if label.is_empty() || !label.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return false;
    }

    let body = &remainder[line_end + 1..];
    let mut offset = 0;
    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(after) = trimmed.strip_prefix(label) {
            let closes = after
                .chars()
                .next()
                .map(|c| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(true);
            if closes {
                let indent = line.len() - trimmed.len();
                lex.bump(line_end + 1 + offset + indent + label.len());
                return true;
            }
        }
        offset += line.len();
    }

    lex.bump(remainder.len());
    true
}

/// Token classes relevant to comment stripping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Comment,
    Whitespace,
    Literal,
    Code,
}

/// Split `source` into classified slices covering the whole input.
pub fn tokenize(source: &str) -> Vec<(TokenClass, &str)> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let class = match result {
            Ok(RawToken::Whitespace) => TokenClass::Whitespace,
            Ok(RawToken::LineComment) | Ok(RawToken::BlockComment) => TokenClass::Comment,
            Ok(RawToken::Str) | Ok(RawToken::Heredoc) => TokenClass::Literal,
            Ok(RawToken::Code) | Err(_) => TokenClass::Code,
        };
        tokens.push((class, lexer.slice()));
    }

    tokens
}

/// Byte ranges of comments and string literals, in source order.
pub fn opaque_spans(source: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for (class, text) in tokenize(source) {
        let end = offset + text.len();
        if matches!(class, TokenClass::Comment | TokenClass::Literal) {
            spans.push(offset..end);
        }
        offset = end;
    }
    spans
}

/// Whether `pos` falls inside one of `spans` (as returned by [`opaque_spans`]).
pub fn is_opaque(spans: &[Range<usize>], pos: usize) -> bool {
    spans
        .binary_search_by(|span| {
            if span.end <= pos {
                Ordering::Less
            } else if span.start > pos {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .is_ok()
}

/// Drop comments and collapse blank-line runs.
///
/// Whitespace runs that contain a line break become a single newline
/// followed by the indentation of the next line, which also removes
/// trailing whitespace. Applying it twice gives the same result.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pending = String::new();

    for (class, text) in tokenize(source) {
        match class {
            TokenClass::Comment => {}
            TokenClass::Whitespace => pending.push_str(text),
            TokenClass::Literal | TokenClass::Code => {
                flush_whitespace(&mut out, &pending);
                pending.clear();
                out.push_str(text);
            }
        }
    }
    flush_whitespace(&mut out, &pending);

    out
}

fn flush_whitespace(out: &mut String, ws: &str) {
    match ws.rfind('\n') {
        Some(last) => {
            out.push('\n');
            out.push_str(&ws[last + 1..]);
        }
        None => out.push_str(ws),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_all_comment_styles() {
        let src = "<?php\n/**\n * Doc\n */\nclass A // trailing\n{\n    # hash\n    /* block */\n    public $x;\n}\n";
        assert_eq!(strip_comments(src), "<?php\nclass A\n{\n    public $x;\n}\n");
    }

    #[test]
    fn test_markers_inside_strings_survive() {
        let src = "$a = 'http://x'; $b = \"# not /* a */ comment\";\n";
        assert_eq!(strip_comments(src), src);
    }

    #[test]
    fn test_attribute_is_not_comment() {
        let src = "#[Route('/a')]\nclass A {}\n";
        assert_eq!(strip_comments(src), src);
    }

    #[test]
    fn test_heredoc_preserved() {
        let src = "$s = <<<EOT\n// keep\n\n# keep\nEOT;\n// drop\n$t = 1;\n";
        assert_eq!(strip_comments(src), "$s = <<<EOT\n// keep\n\n# keep\nEOT;\n$t = 1;\n");
    }

    #[test]
    fn test_blank_line_runs_collapse() {
        let src = "a;\n\n\n   \nb;   \n";
        assert_eq!(strip_comments(src), "a;\nb;\n");
    }

    #[test]
    fn test_idempotent() {
        let src = "<?php\n\n// c\nnamespace A;\n\n/* x */\n\nclass B {\n  // y\n  function f() { return \"//\"; }\n}\n";
        let once = strip_comments(src);
        assert_eq!(strip_comments(&once), once);
    }

    #[test]
    fn test_opaque_spans() {
        let src = "a; /* c */ $s = 'x';\nb;";
        let spans = opaque_spans(src);
        assert_eq!(spans, vec![3..10, 16..19]);
        assert!(is_opaque(&spans, 3));
        assert!(is_opaque(&spans, 9));
        assert!(!is_opaque(&spans, 10));
        assert!(is_opaque(&spans, 17));
        assert!(!is_opaque(&spans, 0));
        assert!(!is_opaque(&spans, 20));
    }

    #[test]
    fn test_line_comment_stops_at_close_tag() {
        assert_eq!(strip_comments("x; // c ?>\n"), "x; ?>\n");
    }
}
