//! The template engine.
//!
//! A [`Template`] owns one block tree plus the masks, processors and
//! [`Options`] used to render it. Instances are independent: nothing is
//! registered process-wide.
//!
//! # Example
//!
//! ```rust
//! use blockplate::Template;
//! use serde_json::json;
//!
//! let mut template = Template::new();
//! template
//!     .load_str(
//!         "<h1>{{title}}</h1><ul><!--START:Row--><li>{{Name}}</li><!--END:Row--></ul>",
//!         "Main",
//!         None,
//!     )
//!     .unwrap();
//!
//! template.bind("Main", json!({"title": "Crew"})).unwrap();
//! template
//!     .bind("Main:Row", json!([{"Name": "Ada"}, {"Name": "Grace"}]))
//!     .unwrap();
//!
//! assert_eq!(
//!     template.render("Main").unwrap(),
//!     "<h1>Crew</h1><ul><li>Ada</li><li>Grace</li></ul>"
//! );
//! ```
//!
//! # Addresses
//!
//! Blocks are addressed by colon-delimited paths from the root block
//! (`"Main:Row"`); the empty string is the root. Loading and
//! [`create_block`](Template::create_block) create missing blocks along the
//! way. Everything else fails with [`Error::AddressNotFound`].

use std::path::Path;
use std::rc::Rc;

use blockplate_parser::{codec, parse};
use log::debug;
use serde::Serialize;

use crate::address::Address;
use crate::bind::Binding;
use crate::error::{Error, Result};
use crate::loader::{Loader, TemplateDir};
use crate::mask::{MaskRegistry, Processors};
use crate::options::Options;
use crate::render::{is_variable_name, Renderer};
use crate::tree::{BlockTree, Variables};
use crate::value::{Record, Value};

/// A block tree with its render configuration.
#[derive(Debug, Default)]
pub struct Template {
    tree: BlockTree,
    masks: MaskRegistry,
    processors: Processors,
    options: Options,
}

impl Template {
    /// Creates an empty template with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Parses `markup` into the block at `address`.
    ///
    /// Without `child`, the parsed code replaces the target's code and the
    /// parsed regions become its children (replacing same-named children;
    /// other children and bound data are kept). With `child`, the markup is
    /// loaded into `address:child` instead. Missing blocks on the way are
    /// created.
    ///
    /// Returns the address of the block that received the markup.
    pub fn load_str(&mut self, markup: &str, address: &str, child: Option<&str>) -> Result<String> {
        let mut target = Address::parse(address)?;
        if let Some(child) = child {
            target = target.child(child)?;
        }

        let parsed = parse(&codec::encode(markup));
        debug!(
            "loading {} byte(s) with {} region(s) into \"{}\"",
            markup.len(),
            parsed.block_count() - 1,
            target
        );

        let id = self.tree.seek_or_create(&target);
        self.tree.graft(id, parsed);
        Ok(target.to_string())
    }

    /// Loads the markup `loader` returns for `name`. See [`load_str`](Self::load_str).
    pub fn load<L>(
        &mut self,
        loader: &L,
        name: &str,
        address: &str,
        child: Option<&str>,
    ) -> Result<String>
    where
        L: Loader + ?Sized,
    {
        let markup = loader.load(name)?;
        self.load_str(&markup, address, child)
    }

    /// Loads a template file. See [`load_str`](Self::load_str).
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        address: &str,
        child: Option<&str>,
    ) -> Result<String> {
        let path = path.as_ref();
        let (dir, name) = match (path.parent(), path.file_name()) {
            (Some(dir), Some(name)) => (dir, name.to_string_lossy()),
            _ => (Path::new("."), path.to_string_lossy()),
        };
        self.load(&TemplateDir::new(dir), &name, address, child)
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Binds serializable data to the block at `address`.
    ///
    /// A map binds named values (nested maps and lists flattened to dotted
    /// names). A list of maps binds rows: the block repeats once per row.
    /// Any other shape fails with [`Error::InvalidDataShape`], as does
    /// mixing rows and named values on one block. A failed bind changes
    /// nothing.
    pub fn bind<T>(&mut self, address: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        let binding = Binding::from_json(serde_json::to_value(data)?)?;
        self.apply(address, binding)
    }

    /// Binds one named value, e.g. a callable or a renderable view.
    ///
    /// `name` must be usable in a placeholder: an identifier, optionally
    /// followed by dotted segments (`user.name`, `tags.0`). Anything else
    /// fails with [`Error::InvalidDataShape`].
    pub fn bind_value(&mut self, address: &str, name: &str, value: impl Into<Value>) -> Result<()> {
        let name = name.trim();
        if !is_variable_name(name) {
            return Err(Error::InvalidDataShape(format!(
                "\"{}\" is not a variable name usable in a placeholder",
                name
            )));
        }
        self.apply(address, Binding::named(name, value.into()))
    }

    /// Appends rows to the block at `address`.
    pub fn bind_rows(&mut self, address: &str, rows: Vec<Record>) -> Result<()> {
        self.apply(address, Binding::rows(rows))
    }

    fn apply(&mut self, address: &str, binding: Binding) -> Result<()> {
        let address = Address::parse(address)?;
        let id = self.tree.seek(&address)?;
        match &binding {
            Binding::Named(values) => debug!("binding {} value(s) to \"{}\"", values.len(), address),
            Binding::Rows(rows) => debug!("binding {} row(s) to \"{}\"", rows.len(), address),
        }
        self.tree.block_mut(id).variables.apply(binding)
    }

    // =========================================================================
    // Masks and processors
    // =========================================================================

    /// Registers a mask. Re-registering a name replaces the previous mask.
    ///
    /// Fails with [`Error::InvalidCallback`] when `name` is not an
    /// identifier, since such a mask could never be referenced.
    pub fn register_mask<F>(&mut self, name: &str, mask: F) -> Result<()>
    where
        F: Fn(Value, &[Value]) -> Value + 'static,
    {
        self.register_mask_with(name, mask, Vec::new())
    }

    /// Registers a mask with parameters passed after the value on every call.
    pub fn register_mask_with<F>(&mut self, name: &str, mask: F, params: Vec<Value>) -> Result<()>
    where
        F: Fn(Value, &[Value]) -> Value + 'static,
    {
        self.masks.register(name, Rc::new(mask), params)
    }

    /// Appends an output processor. Processors run after everything else,
    /// in registration order.
    pub fn register_processor<F>(&mut self, processor: F)
    where
        F: Fn(String) -> String + 'static,
    {
        self.processors.push(Box::new(processor));
    }

    pub fn has_mask(&self, name: &str) -> bool {
        self.masks.contains(name)
    }

    /// Registered mask names, sorted.
    pub fn mask_names(&self) -> Vec<&str> {
        self.masks.names()
    }

    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    // =========================================================================
    // Removal
    // =========================================================================

    /// Removes the block at `address` and everything below it.
    pub fn remove_block(&mut self, address: &str) -> Result<()> {
        let address = Address::parse(address)?;
        self.tree.detach(&address)?;
        debug!("removed block \"{}\"", address);
        Ok(())
    }

    /// Removes one bound name (from every row of a record set), or all bound
    /// data when `name` is `None`.
    pub fn remove_variable(&mut self, address: &str, name: Option<&str>) -> Result<()> {
        let address = Address::parse(address)?;
        let id = self.tree.seek(&address)?;
        self.tree.block_mut(id).variables.remove(name);
        debug!(
            "removed {} from \"{}\"",
            name.map_or_else(|| "all variables".to_string(), |n| format!("\"{}\"", n)),
            address
        );
        Ok(())
    }

    /// Drops every block and bound value. Masks, processors and options stay.
    pub fn clear(&mut self) {
        self.tree.clear();
        debug!("block tree cleared");
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn has_block(&self, address: &str) -> bool {
        Address::parse(address)
            .and_then(|address| self.tree.seek(&address))
            .is_ok()
    }

    /// Creates the block at `address` (and any missing parents) if needed.
    pub fn create_block(&mut self, address: &str) -> Result<()> {
        let address = Address::parse(address)?;
        self.tree.seek_or_create(&address);
        Ok(())
    }

    /// Names of the direct children of the block at `address`, sorted.
    pub fn child_names(&self, address: &str) -> Result<Vec<String>> {
        let id = self.tree.seek(&Address::parse(address)?)?;
        Ok(self.tree.block(id).children.keys().cloned().collect())
    }

    /// The block's code with child regions replaced by placeholders.
    pub fn code(&self, address: &str) -> Result<String> {
        let id = self.tree.seek(&Address::parse(address)?)?;
        Ok(codec::decode(self.tree.block(id).code()))
    }

    pub fn variables(&self, address: &str) -> Result<&Variables> {
        let id = self.tree.seek(&Address::parse(address)?)?;
        Ok(self.tree.block(id).variables())
    }

    /// Number of blocks in the tree, including the root.
    pub fn block_count(&self) -> usize {
        self.tree.len()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Renders the block at `address` with its subtree.
    ///
    /// Rendering never modifies the template, so rendering twice without
    /// changes in between gives the same output.
    pub fn render(&self, address: &str) -> Result<String> {
        let address = Address::parse(address)?;
        let id = self.tree.seek(&address)?;
        let renderer = Renderer::new(&self.tree, &self.masks, &self.processors, &self.options);
        renderer.render(id, address.name().unwrap_or_default())
    }
}
