//! Built-in masks.
//!
//! None of these are active by default. Call [`register_builtin_masks`] to
//! install the standard set, or register individual functions under names
//! of your choosing with [`Template::register_mask_with`] to bind different
//! parameters.
//!
//! | Mask | Effect |
//! |------|--------|
//! | `upper` | uppercase |
//! | `lower` | lowercase |
//! | `trim` | strip surrounding whitespace |
//! | `capitalize` | uppercase the first character |
//! | `nl2br` | insert `<br />` before every newline |
//! | `slug` | ASCII, lowercase, `-`-joined |
//! | `truncate` | cut to a display width (bound parameter, default 80) with `…` |
//!
//! [`fallback`] is not registered by default because it only makes sense
//! with a bound parameter:
//!
//! ```rust
//! use blockplate::{mask::builtin, Template, Value};
//!
//! let mut template = Template::new();
//! template
//!     .register_mask_with("or_dash", builtin::fallback, vec![Value::from("-")])
//!     .unwrap();
//! ```

use crate::error::Result;
use crate::template::Template;
use crate::util::{slugify, truncate_to_width};
use crate::value::Value;

/// Width used by the registered `truncate` mask.
pub const DEFAULT_TRUNCATE_WIDTH: usize = 80;

/// Registers the standard mask set on a template.
pub fn register_builtin_masks(template: &mut Template) -> Result<()> {
    template.register_mask("upper", upper)?;
    template.register_mask("lower", lower)?;
    template.register_mask("trim", trim)?;
    template.register_mask("capitalize", capitalize)?;
    template.register_mask("nl2br", nl2br)?;
    template.register_mask("slug", slug)?;
    template.register_mask_with(
        "truncate",
        truncate,
        vec![Value::from(DEFAULT_TRUNCATE_WIDTH)],
    )?;
    Ok(())
}

pub fn upper(value: Value, _params: &[Value]) -> Value {
    Value::String(value.to_string().to_uppercase())
}

pub fn lower(value: Value, _params: &[Value]) -> Value {
    Value::String(value.to_string().to_lowercase())
}

pub fn trim(value: Value, _params: &[Value]) -> Value {
    Value::String(value.to_string().trim().to_string())
}

pub fn capitalize(value: Value, _params: &[Value]) -> Value {
    let text = value.to_string();
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => Value::String(first.to_uppercase().chain(chars).collect()),
        None => Value::String(text),
    }
}

pub fn nl2br(value: Value, _params: &[Value]) -> Value {
    let text = value.to_string();
    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();

    while let Some(pos) = rest.find('\n') {
        let line_end = if rest[..pos].ends_with('\r') { pos - 1 } else { pos };
        out.push_str(&rest[..line_end]);
        out.push_str("<br />");
        out.push_str(&rest[line_end..=pos]);
        rest = &rest[pos + 1..];
    }
    out.push_str(rest);

    Value::String(out)
}

pub fn slug(value: Value, _params: &[Value]) -> Value {
    Value::String(slugify(&value.to_string()))
}

/// Truncates to the display width given as the first parameter.
pub fn truncate(value: Value, params: &[Value]) -> Value {
    let width = params
        .first()
        .and_then(Value::as_i64)
        .and_then(|w| usize::try_from(w).ok())
        .unwrap_or(DEFAULT_TRUNCATE_WIDTH);
    Value::String(truncate_to_width(&value.to_string(), width))
}

/// Replaces a value that renders empty with the first parameter.
pub fn fallback(value: Value, params: &[Value]) -> Value {
    if value.to_string().is_empty() {
        params.first().cloned().unwrap_or(Value::Null)
    } else {
        value
    }
}
