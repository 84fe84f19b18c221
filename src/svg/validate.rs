//! Structural svg check used to gate pasted and dropped content.

use std::sync::LazyLock;

use regex::Regex;

static RE_SVG_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<svg[^>]*>.*</svg>").expect("svg element pattern is valid"));

/// Returns `true` when `text` has an opening `<svg ...>` tag followed somewhere
/// by a closing `</svg>`, ignoring case and line breaks.
///
/// This is not an XML parser. Tag-shaped garbage passes; anything without
/// the tag pair does not.
#[must_use]
pub fn is_valid_svg(text: &str) -> bool {
    RE_SVG_ELEMENT.is_match(text)
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
