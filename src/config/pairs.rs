//! Flattened key/value pairs
// (c) 2024 Ross Younger

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A value we read from a file
pub struct Pair {
    /// Fully-qualified key: `key`, or `section_key` for a nested entry
    pub key: String,
    /// The normalized value. May be empty.
    pub value: String,
    /// Line number (1-based) within the source
    pub line_number: usize,
}

/// The result of parsing a file: every pair, in document order.
///
/// Keys are not required to be unique. Lookups return the _first_ match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pairs {
    /// If present, this is the file we read
    source: Option<PathBuf>,
    entries: Vec<Pair>,
}

impl Pairs {
    pub(crate) fn new(source: Option<PathBuf>) -> Self {
        Self {
            source,
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: String, value: String, line_number: usize) {
        self.entries.push(Pair {
            key,
            value,
            line_number,
        });
    }

    /// The file these pairs were read from, if any
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Human-readable description of where a pair came from
    #[must_use]
    pub fn describe(&self, pair: &Pair) -> String {
        let src = self
            .source
            .as_ref()
            .map_or_else(|| "<string>".into(), |p| p.display().to_string());
        format!("{src} (line {})", pair.line_number)
    }

    /// All pairs, in document order
    #[must_use]
    pub fn entries(&self) -> &[Pair] {
        &self.entries
    }

    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Are there no pairs at all?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first pair with exactly this key (case-sensitive)
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Pair> {
        self.entries.iter().find(|p| p.key == key)
    }

    /// Returns the value of the first pair with this key, or `default` if there is none.
    ///
    /// A key that is present with an empty value yields the empty string, _not_ the default.
    /// (`ami_id: ""` means "detect it for me", which is different from not saying anything.)
    #[must_use]
    pub fn lookup<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).map_or(default, |p| p.value.as_str())
    }

    /// As [`lookup`](Self::lookup), but a present-but-empty value is treated as absent.
    #[must_use]
    pub fn lookup_nonempty<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(p) if !p.value.is_empty() => &p.value,
            _ => default,
        }
    }
}
