//! Convenient imports.
//!
//! ```rust
//! use blockplate::prelude::*;
//!
//! let mut template = Template::new();
//! template.load_str("{{greeting}}", "", None)?;
//! template.bind_value("", "greeting", "hi")?;
//! assert_eq!(template.render("")?, "hi");
//! # Ok::<(), Error>(())
//! ```

pub use crate::record;
pub use crate::{
    register_builtin_masks, Error, Loader, Options, Record, Renderable, Result, StringLoader,
    Template, TemplateDir, Value,
};
