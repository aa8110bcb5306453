//! Block-region parser for blockplate templates.
//!
//! This crate turns template markup into a tree of named blocks. A block is
//! delimited by a pair of HTML comment markers carrying the same name:
//!
//! ```text
//! <ul><!--START:Row--><li>{{Name}}</li><!--END:Row--></ul>
//! ```
//!
//! Each recognised region is lifted out into a child [`ParsedBlock`] and
//! replaced in its parent's code by a raw placeholder naming the child
//! (`{{{Row}}}`). Differently named regions nest to any depth.
//!
//! # Example
//!
//! ```rust
//! use blockplate_parser::parse;
//!
//! let block = parse("<ul><!--START:Row--><li>{{Name}}</li><!--END:Row--></ul>");
//! assert_eq!(block.code, "<ul>{{{Row}}}</ul>");
//! assert_eq!(block.children["Row"].code, "<li>{{Name}}</li>");
//! ```
//!
//! # Marker Syntax
//!
//! - Start marker: `<!--START:Name-->`
//! - End marker: `<!--END:Name-->`
//! - Whitespace inside the comment delimiters is ignored (`<!-- START:Name -->`)
//! - Names follow identifier rules: `[A-Za-z_][A-Za-z0-9_]*`
//!
//! A start marker only opens a region when a matching end marker with the
//! same name follows it. Markers with invalid names, orphan end markers and
//! unclosed start markers stay in the code as literal text. An end marker
//! never closes a region opened under a different name, and a region
//! always closes at the first end marker carrying its own name.
//!
//! The parser does not encode quotes itself; callers run [`codec::encode`]
//! over markup before handing it to [`parse`].

pub mod codec;

use std::collections::BTreeMap;

/// A block produced by [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBlock {
    /// Template code with every lifted region replaced by `{{{Name}}}`.
    pub code: String,
    /// Child blocks keyed by region name.
    pub children: BTreeMap<String, ParsedBlock>,
}

impl ParsedBlock {
    /// Total number of blocks in this subtree, including `self`.
    pub fn block_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(ParsedBlock::block_count)
            .sum::<usize>()
    }
}

/// Builds the raw placeholder that references a child block by name.
pub fn child_placeholder(name: &str) -> String {
    format!("{{{{{{{}}}}}}}", name)
}

/// Checks whether `s` is a valid block, variable segment or mask name.
///
/// Identifiers start with an ASCII letter or underscore, followed by ASCII
/// letters, digits or underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses markup into a block tree.
///
/// Never fails: anything that does not form a well-matched region is kept
/// as literal code.
pub fn parse(input: &str) -> ParsedBlock {
    let tokens = Tokenizer::new(input).collect::<Vec<_>>();
    build(&tokens)
}

fn build(tokens: &[Token<'_>]) -> ParsedBlock {
    let mut block = ParsedBlock::default();

    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Text(text) => block.code.push_str(text),
            Token::Start { name, raw } => {
                if let Some(offset) = find_matching_end(&tokens[i + 1..], name) {
                    let inner = &tokens[i + 1..i + 1 + offset];
                    block.children.insert(name.to_string(), build(inner));
                    block.code.push_str(&child_placeholder(name));
                    // Skip the interior and the end marker itself
                    i += offset + 2;
                    continue;
                }
                // Unclosed region - literal text
                block.code.push_str(raw);
            }
            Token::End { raw, .. } => {
                // Orphan end marker - literal text
                block.code.push_str(raw);
            }
        }
        i += 1;
    }

    block
}

/// Finds the index of the end marker closing a region named `name`.
///
/// Matching is non-greedy: the first end marker named `name` closes the
/// region, even after another start marker of the same name. Markers with
/// other names are ignored.
fn find_matching_end(tokens: &[Token<'_>], name: &str) -> Option<usize> {
    tokens
        .iter()
        .position(|token| matches!(token, Token::End { name: n, .. } if *n == name))
}

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    /// Literal text, including comments that are not region markers.
    Text(&'a str),
    /// `<!--START:name-->`
    Start { name: &'a str, raw: &'a str },
    /// `<!--END:name-->`
    End { name: &'a str, raw: &'a str },
}

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";

/// Splits markup into text runs and region markers.
struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Classifies a complete `<!-- ... -->` comment.
    fn classify(raw: &'a str) -> Token<'a> {
        let body = raw[COMMENT_OPEN.len()..raw.len() - COMMENT_CLOSE.len()].trim();

        if let Some(name) = body.strip_prefix("START:") {
            if is_identifier(name) {
                return Token::Start { name, raw };
            }
        } else if let Some(name) = body.strip_prefix("END:") {
            if is_identifier(name) {
                return Token::End { name, raw };
            }
        }

        Token::Text(raw)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }

        let remaining = &self.input[self.pos..];

        let Some(open) = remaining.find(COMMENT_OPEN) else {
            // No more comments - rest is text
            self.pos = self.input.len();
            return Some(Token::Text(remaining));
        };

        if open > 0 {
            self.pos += open;
            return Some(Token::Text(&remaining[..open]));
        }

        match remaining[COMMENT_OPEN.len()..].find(COMMENT_CLOSE) {
            Some(close) => {
                let end = COMMENT_OPEN.len() + close + COMMENT_CLOSE.len();
                self.pos += end;
                Some(Self::classify(&remaining[..end]))
            }
            None => {
                // Unterminated comment - rest is text
                self.pos = self.input.len();
                Some(Token::Text(remaining))
            }
        }
    }
}
