//! Template sources.
//!
//! The engine itself never touches the filesystem; markup reaches it
//! through a [`Loader`]. Two loaders are provided:
//!
//! - [`TemplateDir`] reads files below a root directory.
//! - [`StringLoader`] serves markup from memory (embedded templates, tests).
//!
//! # Name Resolution
//!
//! [`TemplateDir`] resolves a name by trying it as given, then with each
//! recognized extension in priority order:
//!
//! | Priority | Extension |
//! |----------|-----------|
//! | 1 (highest) | `.html` |
//! | 2 | `.htm` |
//! | 3 | `.tpl` |
//! | 4 (lowest) | `.txt` |
//!
//! So `"pages/home"` finds `pages/home.html` before `pages/home.tpl`.
//!
//! # Example
//!
//! ```rust
//! use blockplate::{StringLoader, Template};
//!
//! let loader = StringLoader::new().with("list", "<ul>{{{Items}}}</ul>");
//!
//! let mut template = Template::new();
//! template.load(&loader, "list", "Main", None).unwrap();
//! assert!(template.has_block("Main"));
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".html", ".htm", ".tpl", ".txt"];

/// A source of raw template markup.
pub trait Loader {
    /// Returns the full markup for `name`.
    ///
    /// Fails with [`Error::SourceUnreadable`] when the source is missing or
    /// cannot be read.
    fn load(&self, name: &str) -> Result<String>;
}

/// Loads templates from files below a root directory.
#[derive(Debug, Clone)]
pub struct TemplateDir {
    root: PathBuf,
}

impl TemplateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Finds the file `name` refers to, honoring extension priority.
    ///
    /// Names are relative paths with `/` separators; absolute paths and
    /// `..` segments are refused.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            return Err(unreadable(
                name,
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "template names must be relative paths inside the template directory",
                ),
            ));
        }

        let exact = self.root.join(relative);
        if exact.is_file() {
            return Ok(exact);
        }

        TEMPLATE_EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{}{}", name, ext)))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                unreadable(
                    name,
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("no template file in {}", self.root.display()),
                    ),
                )
            })
    }
}

impl Loader for TemplateDir {
    fn load(&self, name: &str) -> Result<String> {
        let path = self.resolve(name)?;
        debug!("reading template \"{}\" from {}", name, path.display());
        fs::read_to_string(&path).map_err(|source| unreadable(name, source))
    }
}

/// Serves templates registered in memory.
#[derive(Debug, Clone, Default)]
pub struct StringLoader {
    templates: HashMap<String, String>,
}

impl StringLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a template.
    pub fn insert(&mut self, name: impl Into<String>, markup: impl Into<String>) {
        self.templates.insert(name.into(), markup.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, markup: impl Into<String>) -> Self {
        self.insert(name, markup);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

impl From<HashMap<String, String>> for StringLoader {
    fn from(templates: HashMap<String, String>) -> Self {
        Self { templates }
    }
}

impl Loader for StringLoader {
    fn load(&self, name: &str) -> Result<String> {
        self.templates.get(name).cloned().ok_or_else(|| {
            unreadable(
                name,
                io::Error::new(io::ErrorKind::NotFound, "no such in-memory template"),
            )
        })
    }
}

fn unreadable(name: &str, source: io::Error) -> Error {
    Error::SourceUnreadable {
        name: name.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_exact_name() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "page.html", "exact");

        let loader = TemplateDir::new(temp.path());
        assert_eq!(loader.load("page.html").unwrap(), "exact");
    }

    #[test]
    fn test_extension_priority() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "page.txt", "txt");
        write(temp.path(), "page.tpl", "tpl");
        write(temp.path(), "page.html", "html");

        let loader = TemplateDir::new(temp.path());
        assert_eq!(loader.load("page").unwrap(), "html");
    }

    #[test]
    fn test_nested_name() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "layouts/base.htm", "base");

        let loader = TemplateDir::new(temp.path());
        assert_eq!(loader.load("layouts/base").unwrap(), "base");
    }

    #[test]
    fn test_missing_file() {
        let temp = TempDir::new().unwrap();
        let loader = TemplateDir::new(temp.path());

        match loader.load("nope") {
            Err(Error::SourceUnreadable { name, source }) => {
                assert_eq!(name, "nope");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected SourceUnreadable, got {:?}", other),
        }
    }

    #[test]
    fn test_escaping_names_refused() {
        let temp = TempDir::new().unwrap();
        let loader = TemplateDir::new(temp.path().join("sub"));
        write(temp.path(), "secret.html", "x");

        for name in ["../secret", "/etc/passwd", ""] {
            assert!(matches!(
                loader.load(name),
                Err(Error::SourceUnreadable { .. })
            ));
        }
    }

    #[test]
    fn test_string_loader() {
        let mut loader = StringLoader::new().with("a", "A");
        loader.insert("b", "B");

        assert_eq!(loader.load("a").unwrap(), "A");
        assert_eq!(loader.load("b").unwrap(), "B");
        assert!(loader.contains("a"));
        assert!(matches!(
            loader.load("c"),
            Err(Error::SourceUnreadable { .. })
        ));
    }
}
