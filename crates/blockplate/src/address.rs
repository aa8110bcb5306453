//! Block addresses.
//!
//! An address is a colon-delimited path of block names relative to the tree
//! root, e.g. `Main:Content:Row`. The empty address denotes the root itself.

use std::fmt;

use blockplate_parser::is_identifier;

use crate::error::{Error, Result};

/// Separator between address segments.
pub const ADDRESS_SEPARATOR: char = ':';

/// A parsed, validated block address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address {
    segments: Vec<String>,
}

impl Address {
    /// The root address.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses `Main:Content:Row` into its segments.
    ///
    /// Surrounding whitespace per segment is ignored. Every segment must be
    /// an identifier; empty segments (`Main::Row`, `:Main`) are rejected.
    pub fn parse(address: &str) -> Result<Self> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let segments = trimmed
            .split(ADDRESS_SEPARATOR)
            .map(|segment| {
                let segment = segment.trim();
                if is_identifier(segment) {
                    Ok(segment.to_string())
                } else {
                    Err(Error::InvalidAddress {
                        address: address.to_string(),
                        reason: "segments must be identifiers",
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Whether this is the root address.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path segments from the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// The address of the parent block, or `None` for the root.
    pub fn parent(&self) -> Option<Address> {
        if self.is_root() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Appends one segment.
    pub fn child(&self, name: &str) -> Result<Address> {
        if !is_identifier(name) {
            return Err(Error::InvalidAddress {
                address: name.to_string(),
                reason: "child names must be identifiers",
            });
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", ADDRESS_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root() {
        assert!(Address::parse("").unwrap().is_root());
        assert!(Address::parse("   ").unwrap().is_root());
    }

    #[test]
    fn test_parse_segments() {
        let address = Address::parse("Main:Content:Row").unwrap();
        assert_eq!(address.segments(), ["Main", "Content", "Row"]);
        assert_eq!(address.name(), Some("Row"));
        assert_eq!(address.to_string(), "Main:Content:Row");
    }

    #[test]
    fn test_parse_trims_segments() {
        let address = Address::parse(" Main : Row ").unwrap();
        assert_eq!(address.to_string(), "Main:Row");
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert!(matches!(
            Address::parse("Main::Row"),
            Err(Error::InvalidAddress { .. })
        ));
        assert!(Address::parse(":Main").is_err());
    }

    #[test]
    fn test_parse_rejects_bad_identifier() {
        assert!(Address::parse("Main:1Row").is_err());
        assert!(Address::parse("Main.Row").is_err());
    }

    #[test]
    fn test_parent_and_child() {
        let address = Address::parse("Main:Row").unwrap();
        assert_eq!(address.parent().unwrap().to_string(), "Main");
        assert!(Address::root().parent().is_none());
        assert_eq!(address.child("Cell").unwrap().to_string(), "Main:Row:Cell");
        assert!(address.child("bad name").is_err());
    }
}
