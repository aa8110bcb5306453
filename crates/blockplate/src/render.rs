//! The render pipeline.
//!
//! Rendering a block runs these phases in order; each depends on the output
//! of the one before:
//!
//! 1. **Resolve**: depth first. A block's code is substituted against its
//!    record (once) or its record set (once per row, concatenated), then
//!    every child is resolved and inlined at its raw placeholder.
//! 2. **Fold literals**: `` `text`|mask `` becomes `{{_lit_<hash>|mask}}`
//!    with the literal text bound under the hidden name.
//! 3. **Global pass**: the root block's named values and the hidden literal
//!    values are substituted across the whole output.
//! 4. **Strip unused placeholders** (optional).
//! 5. **Strip comments** (optional), keeping annotated ones.
//! 6. **Decode** quote sentinels.
//! 7. **Processors**, in registration order.
//!
//! # Placeholders
//!
//! | Form | Output |
//! |------|--------|
//! | `{{name}}` | value, HTML-escaped, then masks |
//! | `{{{name}}}` | value as-is, then masks |
//!
//! Names are identifiers optionally followed by dotted segments
//! (`user.name`, `tags.0`). Whitespace inside the braces is ignored.
//! Both forms are matched in a single scan, so text produced by one
//! substitution is never rescanned by the same pass.

use std::collections::HashMap;

use blockplate_parser::codec;
use indextree::NodeId;
use log::trace;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::mask::{MaskRegistry, Processors};
use crate::options::Options;
use crate::tree::{Block, BlockTree, Variables};
use crate::util::escape_html;
use crate::value::{Record, Value};

/// Prefix of the hidden variables that carry folded literal text.
pub const LITERAL_PREFIX: &str = "_lit_";

/// 1-based row number injected into every row of a record set.
pub const ROW_NUMBER: &str = "_row";
pub const ROW_FIRST: &str = "_first";
pub const ROW_LAST: &str = "_last";
pub const ROW_ODD: &str = "_odd";
pub const ROW_EVEN: &str = "_even";

const NAME: &str = r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)*";
const CHAIN: &str = r"(?:\s*\|\s*[A-Za-z_][A-Za-z0-9_]*)*";

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\{{\{{\{{\s*(?P<raw>{NAME})(?P<raw_masks>{CHAIN})\s*\}}\}}\}}|\{{\{{\s*(?P<esc>{NAME})(?P<esc_masks>{CHAIN})\s*\}}\}}"
    ))
    .expect("placeholder pattern is valid")
});

static RAW_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\{{\{{\{{\s*(?P<raw>{NAME})(?P<raw_masks>{CHAIN})\s*\}}\}}\}}"
    ))
    .expect("raw placeholder pattern is valid")
});

static LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"`(?P<body>[^`]*)`(?P<masks>{CHAIN})"))
        .expect("literal pattern is valid")
});

static VARIABLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{NAME}$")).expect("variable name pattern is valid"));

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("comment pattern is valid"));

/// Renders blocks of one tree with one set of registries.
pub(crate) struct Renderer<'a> {
    tree: &'a BlockTree,
    masks: &'a MaskRegistry,
    processors: &'a Processors,
    options: &'a Options,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        tree: &'a BlockTree,
        masks: &'a MaskRegistry,
        processors: &'a Processors,
        options: &'a Options,
    ) -> Self {
        Self {
            tree,
            masks,
            processors,
            options,
        }
    }

    /// Runs the full pipeline for the block `id`.
    pub(crate) fn render(&self, id: NodeId, name: &str) -> Result<String> {
        let resolved = self.resolve(id, name)?;

        let (folded, literals) = fold_literals(&resolved);
        trace!("folded {} literal(s)", literals.len());

        let mut output = match self.global_record(literals) {
            Some(record) => self.substitute(&folded, &record)?,
            None => folded,
        };

        if self.options.strips_unused() {
            output = strip_placeholders(&output);
        }
        if self.options.strips_comments() {
            output = strip_comments(&output, self.options.marker());
        }

        let decoded = codec::decode(&output);
        Ok(self.processors.run(decoded))
    }

    /// Produces the fully substituted value of one block and its subtree.
    fn resolve(&self, id: NodeId, name: &str) -> Result<String> {
        let block = self.tree.block(id);

        let value = match &block.variables {
            vars if vars.is_empty() => block.code.clone(),
            Variables::RecordSet(rows) => {
                let count = rows.len();
                let mut out = String::new();
                for (i, row) in rows.iter().enumerate() {
                    out.push_str(&self.substitute(&block.code, &with_row_fields(row, i, count))?);
                }
                out
            }
            Variables::Record(record) => self.substitute(&block.code, record)?,
        };

        let value = self.inline_children(value, block)?;
        trace!(
            "resolved block {} ({} bytes)",
            if name.is_empty() { "<root>" } else { name },
            value.len()
        );
        Ok(value)
    }

    /// Replaces raw child placeholders with the children's resolved output.
    fn inline_children(&self, value: String, block: &Block) -> Result<String> {
        if block.children.is_empty() {
            return Ok(value);
        }

        let mut resolved: HashMap<&str, String> = HashMap::new();
        replace_all(&RAW_PLACEHOLDER, &value, |caps| {
            let name = &caps["raw"];
            let Some((child_name, &child_id)) = block.children.get_key_value(name) else {
                return Ok(None);
            };
            let output = match resolved.get(child_name.as_str()) {
                Some(output) => output.clone(),
                None => {
                    let output = self.resolve(child_id, child_name)?;
                    resolved.insert(child_name.as_str(), output.clone());
                    output
                }
            };
            let masked = self
                .masks
                .apply_chain(mask_chain(&caps["raw_masks"]), Value::String(output));
            Ok(Some(masked.to_string()))
        })
    }

    /// Substitutes every placeholder whose name is bound in `record`.
    ///
    /// Unbound placeholders are left untouched and masks never run for them.
    fn substitute(&self, code: &str, record: &Record) -> Result<String> {
        if record.is_empty() {
            return Ok(code.to_string());
        }

        replace_all(&PLACEHOLDER, code, |caps| {
            let (name, masks, escape) = match caps.name("raw") {
                Some(raw) => (raw.as_str(), &caps["raw_masks"], false),
                None => (&caps["esc"], &caps["esc_masks"], true),
            };
            match record.get(name) {
                Some(value) => self.emit(value, masks, escape).map(Some),
                None => Ok(None),
            }
        })
    }

    /// Formats one bound value for output.
    /// Quote sentinels in the value are turned back into quotes here, so
    /// escaping sees them and the final decode finds none left in data.
    fn emit(&self, value: &Value, masks: &str, escape: bool) -> Result<String> {
        let mut value = value.resolve()?;
        if escape {
            value = Value::String(escape_html(&codec::decode(&value.to_string())));
        } else if let Value::String(s) = &value {
            value = Value::String(codec::decode(s));
        }
        Ok(self.masks.apply_chain(mask_chain(masks), value).to_string())
    }

    /// The record for the global pass: the root's named values, then literals.
    fn global_record(&self, literals: Record) -> Option<Record> {
        let mut record = match &self.tree.block(self.tree.root()).variables {
            Variables::Record(record) => record.clone(),
            Variables::RecordSet(_) => Record::new(),
        };
        record.extend(literals);
        (!record.is_empty()).then_some(record)
    }
}

/// Copies a row and adds the positional fields, shadowing same-named data.
fn with_row_fields(row: &Record, index: usize, count: usize) -> Record {
    let mut row = row.clone();
    row.insert(ROW_NUMBER.to_string(), Value::from(index + 1));
    row.insert(ROW_FIRST.to_string(), Value::Bool(index == 0));
    row.insert(ROW_LAST.to_string(), Value::Bool(index + 1 == count));
    row.insert(ROW_ODD.to_string(), Value::Bool(index % 2 == 1));
    row.insert(ROW_EVEN.to_string(), Value::Bool(index % 2 == 0));
    row
}

/// True when `name` can be referenced from a placeholder.
pub(crate) fn is_variable_name(name: &str) -> bool {
    VARIABLE_NAME.is_match(name)
}

/// Splits a captured `|a|b` suffix into mask names.
fn mask_chain(masks: &str) -> impl Iterator<Item = &str> {
    masks.split('|').map(str::trim).filter(|name| !name.is_empty())
}

/// Name of the hidden variable holding `body`.
pub(crate) fn literal_name(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    let hex: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}{}", LITERAL_PREFIX, hex)
}

/// Rewrites back-quoted literals to escaped placeholders.
///
/// Returns the rewritten text and the hidden values to bind.
pub(crate) fn fold_literals(text: &str) -> (String, Record) {
    let mut literals = Record::new();
    let folded = LITERAL.replace_all(text, |caps: &Captures| {
        let body = &caps["body"];
        let name = literal_name(body);
        literals
            .entry(name.clone())
            .or_insert_with(|| Value::from(body));
        format!("{{{{{}{}}}}}", name, &caps["masks"])
    });
    (folded.into_owned(), literals)
}

/// Removes every remaining placeholder.
pub(crate) fn strip_placeholders(text: &str) -> String {
    PLACEHOLDER.replace_all(text, "").into_owned()
}

/// Removes comments whose body does not start with `marker`.
pub(crate) fn strip_comments(text: &str, marker: char) -> String {
    COMMENT
        .replace_all(text, |caps: &Captures| {
            if caps[1].starts_with(marker) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// `Regex::replace_all` with a fallible replacer.
///
/// The replacer returns `None` to keep the matched text.
fn replace_all<F>(re: &Regex, text: &str, mut replace: F) -> Result<String>
where
    F: FnMut(&Captures) -> Result<Option<String>>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        match replace(&caps)? {
            Some(replacement) => out.push_str(&replacement),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}
