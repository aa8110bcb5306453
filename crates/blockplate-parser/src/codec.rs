//! Quote codec for multi-pass substitution.
//!
//! Template markup goes through several textual passes (block extraction,
//! placeholder substitution, literal folding, stripping). Literal quote
//! characters are swapped for sentinel characters from the Unicode private
//! use area before any of those passes run, and swapped back as the very
//! last text transform of a render.
//!
//! ```rust
//! use blockplate_parser::codec::{decode, encode};
//!
//! let markup = r#"<a href="/x" title='y'>"#;
//! let encoded = encode(markup);
//! assert!(!encoded.contains('"'));
//! assert_eq!(decode(&encoded), markup);
//! ```

/// Sentinel standing in for `'` between [`encode`] and [`decode`].
pub const SINGLE_QUOTE_SENTINEL: char = '\u{E001}';

/// Sentinel standing in for `"` between [`encode`] and [`decode`].
pub const DOUBLE_QUOTE_SENTINEL: char = '\u{E002}';

/// Replaces literal quote characters with their sentinels.
pub fn encode(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\'' => SINGLE_QUOTE_SENTINEL,
            '"' => DOUBLE_QUOTE_SENTINEL,
            other => other,
        })
        .collect()
}

/// Inverse of [`encode`].
pub fn decode(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            SINGLE_QUOTE_SENTINEL => '\'',
            DOUBLE_QUOTE_SENTINEL => '"',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_removes_quotes() {
        let encoded = encode(r#"say "hi" and 'bye'"#);
        assert!(!encoded.contains('"'));
        assert!(!encoded.contains('\''));
        assert_eq!(encoded.matches(DOUBLE_QUOTE_SENTINEL).count(), 2);
        assert_eq!(encoded.matches(SINGLE_QUOTE_SENTINEL).count(), 2);
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(encode("{{{name|upper}}}"), "{{{name|upper}}}");
        assert_eq!(decode("<p>plain</p>"), "<p>plain</p>");
    }

    #[test]
    fn test_round_trip() {
        let input = r#"<input value="{{v}}" data-x='1'>"#;
        assert_eq!(decode(&encode(input)), input);
    }

    #[test]
    fn test_empty() {
        assert_eq!(encode(""), "");
        assert_eq!(decode(""), "");
    }
}
