//! Line parsing internals
// (c) 2024 Ross Younger
//!
//! # Inline comments and quotes
//!
//! A `#` after some content starts an inline comment, which is stripped...
//! **unless the line contains a quote character (`"` or `'`) anywhere**.
//! In that case the line is left intact so that a quoted value like
//! `"abc#def"` survives. The flip side is that a line such as
//!
//! ```text
//! description: it's fast   # a comment
//! ```
//!
//! keeps `# a comment` as part of its value, because of the apostrophe.
//! Existing configuration and preset files rely on this rule, so it is kept as is.

/// The comment marker
const COMMENT: char = '#';

/// Prepares a raw line for classification.
///
/// Returns `None` if the line carries no data (blank, or a comment line).
/// Otherwise returns the line with any trailing line terminator, inline comment
/// (subject to the quote rule above) and trailing whitespace removed.
/// Leading whitespace is preserved; it is significant.
pub(crate) fn normalize_line(raw: &str) -> Option<&str> {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let content = line.trim_start();
    if content.is_empty() || content.starts_with(COMMENT) {
        return None;
    }

    let line = if line.contains(['"', '\'']) {
        line
    } else {
        line.split_once(COMMENT).map_or(line, |(before, _)| before)
    };
    Some(line.trim_end())
}

/// Cleans up the text captured after a key's colon.
///
/// Trims whitespace, then removes at most one matching pair of outer quotes.
/// Escape sequences are not interpreted. An empty result is a legitimate value.
#[must_use]
pub fn normalize_value(raw: &str) -> String {
    let value = raw.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_owned();
        }
    }
    value.to_owned()
}

///////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, PartialEq)]
/// The shape of a normalized line
pub(super) enum Line<'a> {
    /// Nothing we recognise
    Ignored,
    /// `name:` on its own, at the left margin
    Section(&'a str),
    /// `key: value`. `indented` is true if the line began with whitespace.
    Entry {
        indented: bool,
        key: &'a str,
        raw_value: &'a str,
    },
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits `IDENT:rest` into `(IDENT, rest)`.
fn split_key(body: &str) -> Option<(&str, &str)> {
    if !body.starts_with(is_identifier_start) {
        return None;
    }
    let end = body
        .find(|c: char| !is_identifier_char(c))
        .unwrap_or(body.len());
    let (key, rest) = body.split_at(end);
    rest.strip_prefix(':').map(|rest| (key, rest))
}

/// Classifies a normalized line.
///
/// Tested in order: section header, indented entry, top-level entry. First match wins.
pub(super) fn classify(line: &str) -> Line<'_> {
    let body = line.trim_start();
    let indented = body.len() != line.len();
    let Some((key, rest)) = split_key(body) else {
        return Line::Ignored;
    };

    if !indented && rest.trim().is_empty() {
        Line::Section(key)
    } else if rest.is_empty() {
        // `key:` with no value; only meaningful at the left margin, where it is a section
        Line::Ignored
    } else {
        Line::Entry {
            indented,
            key,
            raw_value: rest,
        }
    }
}

///////////////////////////////////////////////////////////////////////////////////////
