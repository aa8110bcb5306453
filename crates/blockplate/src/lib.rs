//! # Blockplate - Logic-Free Block Templates
//!
//! `blockplate` renders markup built from named, nestable regions ("blocks")
//! and placeholders. Templates carry no control flow: repetition comes from
//! binding a list of records to a block, structure comes from the block tree.
//!
//! ## Core Concepts
//!
//! - [`Template`]: owns the block tree, masks, processors and [`Options`]
//! - Blocks: regions marked `<!--START:Name-->` … `<!--END:Name-->`, lifted
//!   into child blocks and addressed as `Parent:Name`
//! - Placeholders: `{{name}}` (HTML-escaped) and `{{{name}}}` (raw), both
//!   accepting mask chains: `{{price|money|bold}}`
//! - [`Value`]: what can be bound, including callables and [`Renderable`] views
//! - Masks: named value transforms (see [`mask::builtin`] for a standard set)
//! - Processors: whole-output transforms run after rendering
//!
//! ## Quick Start
//!
//! ```rust
//! use blockplate::{register_builtin_masks, Template};
//! use serde_json::json;
//!
//! let mut template = Template::new();
//! register_builtin_masks(&mut template).unwrap();
//!
//! template
//!     .load_str(
//!         "<table><!--START:Row--><tr class=\"r{{_row}}\"><td>{{name|upper}}</td></tr><!--END:Row--></table>",
//!         "Report",
//!         None,
//!     )
//!     .unwrap();
//! template
//!     .bind("Report:Row", json!([{"name": "ada"}, {"name": "grace"}]))
//!     .unwrap();
//!
//! let html = template.render("Report").unwrap();
//! assert_eq!(
//!     html,
//!     "<table><tr class=\"r1\"><td>ADA</td></tr><tr class=\"r2\"><td>GRACE</td></tr></table>"
//! );
//! ```
//!
//! ## Row Fields
//!
//! Every row of a bound list also exposes `_row` (1-based), `_first`,
//! `_last`, `_odd` and `_even`. The parity fields count from zero, so the
//! first row is `_even`.
//!
//! ## Literals
//!
//! Back-quoted text is treated like a bound value, so it is escaped and can
//! take masks: `` `Read more`|upper `` renders `READ MORE`.
//!
//! ## Comments
//!
//! HTML comments are removed from the output unless their body starts with
//! the annotation marker (`@` by default): `<!--@ build 42 -->` survives.

pub mod error;
pub mod loader;
pub mod mask;
pub mod options;
pub mod prelude;
pub mod value;

mod address;
mod bind;
mod render;
mod template;
mod tree;
mod util;

pub use address::{Address, ADDRESS_SEPARATOR};
pub use blockplate_parser::codec;
pub use error::{Error, Result};
pub use loader::{Loader, StringLoader, TemplateDir, TEMPLATE_EXTENSIONS};
pub use mask::builtin::register_builtin_masks;
pub use mask::{MaskFn, ProcessorFn};
pub use options::{Options, DEFAULT_ANNOTATION_MARKER};
pub use render::{LITERAL_PREFIX, ROW_EVEN, ROW_FIRST, ROW_LAST, ROW_NUMBER, ROW_ODD};
pub use template::Template;
pub use tree::Variables;
pub use util::{escape_html, slugify, truncate_to_width};
pub use value::{Record, Renderable, Value};
