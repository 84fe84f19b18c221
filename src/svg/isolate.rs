//! Style isolation for inline svg rendering.
//!
//! DESIGN
//! ======
//! Many svgs rendered into one document share a single CSS scope, so two
//! icons that both define `.cls-1` fight over it. Every class name in an svg
//! is rewritten to `svg-{id}-{name}`, using the record id as the namespace.
//! The rewrite happens at render time only; stored markup is never touched.
//!
//! LIMITATIONS
//! ===========
//! - Only the first `<style>` block is rewritten. Later blocks keep their
//!   original selectors and will no longer match the renamed classes.
//! - Element, id, and attribute selectors are left alone, so collisions
//!   through those remain possible.
//! - Braces inside quoted strings are not recognized when splitting rules
//!   from declaration blocks.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static RE_STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(<style[^>]*>)(.*?)(</style\s*>)").expect("style block pattern is valid"));

// Group 1 is text kept verbatim (comments, quoted strings, `url(...)`).
// Group 2 is a class name, which has to start with a letter, `_`, or `-`.
static RE_CLASS_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)(/\*.*?\*/|"[^"]*"|'[^']*'|url\([^)]*\))|\.(-?[_a-zA-Z][_a-zA-Z0-9-]*)"#)
        .expect("class selector pattern is valid")
});

static RE_CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s)class(\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).expect("class attribute pattern is valid")
});

/// Rewrite class selectors and `class` attributes in `svg_code` so they are
/// namespaced by `id`.
///
/// An empty `id` returns the markup unchanged.
#[must_use]
pub fn pre_process(svg_code: &str, id: &str) -> String {
    if id.is_empty() {
        return svg_code.to_string();
    }
    let prefix = class_prefix(id);

    let styled = match RE_STYLE_BLOCK.captures(svg_code) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let css = caps.get(2).map_or("", |m| m.as_str());
            let scoped = prefix_selectors(css, &prefix);
            let mut out = String::with_capacity(svg_code.len() + scoped.len());
            out.push_str(&svg_code[..whole.start]);
            out.push_str(&caps[1]);
            out.push_str(&scoped);
            out.push_str(&caps[3]);
            out.push_str(&svg_code[whole.end..]);
            out
        }
        None => svg_code.to_string(),
    };

    prefix_class_attributes(&styled, &prefix)
}

/// The namespace every class in svg `id` is moved into.
#[must_use]
pub fn class_prefix(id: &str) -> String {
    format!("svg-{id}-")
}

/// Rewrite class selectors in rule preludes only. Text before a `{` is a
/// prelude; text before a `}` is a declaration block and is copied as-is, so
/// values like `url(x.png)` keep their dots.
fn prefix_selectors(css: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(at) = rest.find(['{', '}']) {
        let (chunk, tail) = rest.split_at(at);
        if tail.starts_with('{') {
            // Statements such as `@import url(a.css);` end before the selector.
            let start = chunk.rfind(';').map_or(0, |i| i + 1);
            out.push_str(&chunk[..start]);
            out.push_str(&prefix_class_tokens(&chunk[start..], prefix));
        } else {
            out.push_str(chunk);
        }
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

fn prefix_class_tokens(selector: &str, prefix: &str) -> String {
    RE_CLASS_SELECTOR
        .replace_all(selector, |caps: &Captures| match caps.get(2) {
            Some(class) => format!(".{prefix}{}", class.as_str()),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn prefix_class_attributes(markup: &str, prefix: &str) -> String {
    RE_CLASS_ATTR
        .replace_all(markup, |caps: &Captures| {
            let (quote, value) = match (caps.get(3), caps.get(4)) {
                (Some(m), _) => ('"', m.as_str()),
                (None, Some(m)) => ('\'', m.as_str()),
                (None, None) => ('"', ""),
            };
            let tokens: Vec<String> = value
                .split_whitespace()
                .map(|token| format!("{prefix}{token}"))
                .collect();
            if tokens.is_empty() {
                return caps[0].to_string();
            }
            format!("{}class{}{quote}{}{quote}", &caps[1], &caps[2], tokens.join(" "))
        })
        .into_owned()
}

#[cfg(test)]
#[path = "isolate_test.rs"]
mod tests;
