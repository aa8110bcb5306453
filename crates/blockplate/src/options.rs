//! Render options.

/// Marker that keeps a comment through comment stripping: `<!--@ keep -->`.
pub const DEFAULT_ANNOTATION_MARKER: char = '@';

/// Switches for the clean-up phases of rendering.
///
/// ```rust
/// use blockplate::{Options, Template};
///
/// let template = Template::with_options(Options::default().strip_comments(false));
/// assert!(!template.options().strips_comments());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    strip_unused: bool,
    strip_comments: bool,
    annotation_marker: char,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            strip_unused: true,
            strip_comments: true,
            annotation_marker: DEFAULT_ANNOTATION_MARKER,
        }
    }
}

impl Options {
    /// Remove placeholders that never received a value.
    pub fn strip_unused(mut self, enabled: bool) -> Self {
        self.strip_unused = enabled;
        self
    }

    /// Remove comments that do not start with the annotation marker.
    pub fn strip_comments(mut self, enabled: bool) -> Self {
        self.strip_comments = enabled;
        self
    }

    /// Set the character that marks a comment as kept.
    pub fn annotation_marker(mut self, marker: char) -> Self {
        self.annotation_marker = marker;
        self
    }

    pub fn strips_unused(&self) -> bool {
        self.strip_unused
    }

    pub fn strips_comments(&self) -> bool {
        self.strip_comments
    }

    pub fn marker(&self) -> char {
        self.annotation_marker
    }

    /// In-place toggle, for use through [`Template::options_mut`](crate::Template::options_mut).
    pub fn set_strip_unused(&mut self, enabled: bool) {
        self.strip_unused = enabled;
    }

    /// In-place toggle, for use through [`Template::options_mut`](crate::Template::options_mut).
    pub fn set_strip_comments(&mut self, enabled: bool) {
        self.strip_comments = enabled;
    }
}
