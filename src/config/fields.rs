//! Declarative field tables, and the overlay that applies them
// (c) 2024 Ross Younger

use std::{borrow::Cow, fmt::Display};

use anyhow::{Context as _, Result};
use tabled::{settings::style::Style, Table, Tabled};
use tracing::warn;

use super::Pairs;

/// What an empty value in a file means for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence {
    /// `key: ""` sets the field to the empty string
    EmptyIsValue,
    /// `key: ""` is treated as if the key wasn't there at all
    EmptyIsAbsent,
}

/// Writes a textual value into a record field, converting it as required
pub(crate) type Assign<T> = fn(&mut T, &str) -> Result<()>;

/// Describes one field of a record: where it lives in the file, and its default.
pub(crate) struct Field<T> {
    /// Enclosing section, if any
    pub(crate) section: Option<&'static str>,
    /// Leaf key name
    pub(crate) name: &'static str,
    /// Hard-wired default, in file syntax
    pub(crate) default: &'static str,
    pub(crate) presence: Presence,
    /// One-line description (used for templates)
    pub(crate) doc: &'static str,
    pub(crate) assign: Assign<T>,
    /// Reads the field back out, formatted for display
    pub(crate) read: fn(&T) -> String,
}

impl<T> Field<T> {
    /// The fully-qualified key, e.g. `aws_region`
    pub(crate) fn key(&self) -> Cow<'static, str> {
        match self.section {
            None => Cow::Borrowed(self.name),
            Some(s) => Cow::Owned(format!("{s}_{}", self.name)),
        }
    }
}

/// Defines a [`Field`] that holds a plain string.
macro_rules! string_field {
    ($sec:expr, $name:literal, $member:ident, $default:literal, $presence:ident, $doc:literal) => {
        $crate::config::fields::Field {
            section: $sec,
            name: $name,
            default: $default,
            presence: $crate::config::fields::Presence::$presence,
            doc: $doc,
            assign: |rec, v| {
                rec.$member = v.to_owned();
                Ok(())
            },
            read: |rec| rec.$member.clone(),
        }
    };
}

/// Defines a [`Field`] whose value is converted with the given function.
macro_rules! typed_field {
    ($section:expr, $name:literal, $member:ident, $default:literal, $parse:path, $doc:literal) => {
        $crate::config::fields::Field {
            section: $section,
            name: $name,
            default: $default,
            presence: $crate::config::fields::Presence::EmptyIsAbsent,
            doc: $doc,
            assign: |rec, v| {
                rec.$member = $parse(v)?;
                Ok(())
            },
            read: |rec| rec.$member.to_string(),
        }
    };
}

pub(crate) use {string_field, typed_field};

/// Parses an unsigned number field
pub(crate) fn parse_u32(s: &str) -> Result<u32> {
    s.parse()
        .with_context(|| format!("expected a whole number, found {s:?}"))
}

/// Parses a boolean field. We accept the usual spellings.
pub(crate) fn parse_bool(s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("expected true or false, found {s:?}"),
    }
}

///////////////////////////////////////////////////////////////////////////////////////

/// Where a resolved value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// The hard-wired default
    Default,
    /// A file, as described by [`Pairs::describe`]
    File(String),
    /// A command-line option
    CommandLine,
    /// Computed from the invoking user's identity
    CurrentUser,
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Default => f.write_str("default"),
            Source::File(s) => f.write_str(s),
            Source::CommandLine => f.write_str("command line"),
            Source::CurrentUser => f.write_str("current user"),
        }
    }
}

/// Where every field of a record came from, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance(Vec<(String, Source)>);

impl Provenance {
    /// Iterates over `(fully-qualified key, source)`
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Source)> {
        self.0.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Looks up the source of a field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Source> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub(crate) fn set(&mut self, key: &str, source: Source) {
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| k == key) {
            entry.1 = source;
        } else {
            self.0.push((key.to_owned(), source));
        }
    }
}

/// Builds a record by looking up every field of `fields` in `pairs`, falling back to
/// each field's default.
///
/// A value that is present but can't be converted is reported and ignored; the field keeps its default.
pub(crate) fn overlay<T: Default>(fields: &[Field<T>], pairs: &Pairs) -> Result<(T, Provenance)> {
    let mut record = T::default();
    let mut provenance = Provenance::default();

    for field in fields {
        let key = field.key();
        let found = pairs
            .get(&key)
            .filter(|p| field.presence == Presence::EmptyIsValue || !p.value.is_empty());

        let source = match found {
            Some(pair) => match (field.assign)(&mut record, &pair.value) {
                Ok(()) => Source::File(pairs.describe(pair)),
                Err(e) => {
                    warn!(
                        "ignoring `{key}` at {}: {e:#}; using default {:?}",
                        pairs.describe(pair),
                        field.default
                    );
                    (field.assign)(&mut record, field.default)
                        .with_context(|| format!("default value for `{key}`"))?;
                    Source::Default
                }
            },
            None => {
                (field.assign)(&mut record, field.default)
                    .with_context(|| format!("default value for `{key}`"))?;
                Source::Default
            }
        };
        provenance.set(&key, source);
    }
    Ok((record, provenance))
}

/// Renders a commented template for a field table, grouping sections together.
///
/// The output is in the accepted file format and parses back to the defaults.
pub(crate) fn template<T>(fields: &[Field<T>], placeholders: &[(&str, &str)]) -> String {
    use std::fmt::Write as _;

    let mut sections: Vec<Option<&str>> = Vec::new();
    for f in fields {
        if !sections.contains(&f.section) {
            sections.push(f.section);
        }
    }
    // Top-level keys first; a section can only be closed by a top-level key
    sections.sort_by_key(Option::is_some);

    let mut out = String::new();
    for section in sections {
        let indent = if let Some(s) = section {
            let _ = writeln!(out, "\n{s}:");
            "  "
        } else {
            ""
        };
        for f in fields.iter().filter(|f| f.section == section) {
            let key = f.key();
            let value = placeholders
                .iter()
                .find(|(k, _)| *k == key)
                .map_or(f.default, |(_, v)| *v);
            let _ = writeln!(out, "{indent}# {}", f.doc);
            if value.is_empty() {
                let _ = writeln!(out, "{indent}{}: \"\"", f.name);
            } else {
                let _ = writeln!(out, "{indent}{}: {value}", f.name);
            }
        }
    }
    out
}

// PRETTY PRINT SUPPORT ///////////////////////////////////////////////////////////////////////////////////////

#[derive(Tabled)]
struct PrettyField {
    field: String,
    value: String,
    source: String,
}

/// Tabulates every field of a record with its value and where the value came from
pub(crate) fn table<T>(fields: &[Field<T>], record: &T, provenance: &Provenance) -> Table {
    let rows = fields.iter().map(|f| {
        let field = f.key().into_owned();
        let source = provenance
            .get(&field)
            .map_or_else(String::new, ToString::to_string);
        PrettyField {
            field,
            value: (f.read)(record),
            source,
        }
    });
    let mut table = Table::new(rows);
    let _ = table.with(Style::sharp());
    table
}

///////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod test {
    use super::{overlay, parse_bool, parse_u32, table, template, Field, Source};
    use crate::config::Parser;

    #[derive(Debug, Default, PartialEq)]
    struct Rec {
        a: String,
        b: String,
        n: u32,
        flag: bool,
    }

    const FIELDS: &[Field<Rec>] = &[
        string_field!(None, "a", a, "alpha", EmptyIsValue, "The a field"),
        string_field!(Some("sec"), "b", b, "beta", EmptyIsAbsent, "The b field"),
        typed_field!(Some("sec"), "n", n, "7", parse_u32, "A number"),
        typed_field!(None, "flag", flag, "false", parse_bool, "A flag"),
    ];

    fn load(s: &str) -> (Rec, super::Provenance) {
        overlay(FIELDS, &Parser::for_str(s).parse().unwrap()).unwrap()
    }

    #[test]
    fn all_defaults() {
        let (rec, prov) = load("");
        assert_eq!(
            rec,
            Rec {
                a: "alpha".into(),
                b: "beta".into(),
                n: 7,
                flag: false
            }
        );
        assert!(prov.iter().all(|(_, s)| *s == Source::Default));
        assert_eq!(prov.iter().count(), 4);
    }

    #[test]
    fn file_values() {
        let (rec, prov) = load("a: x\nflag: yes\nsec:\n  b: y\n  n: 42\n");
        assert_eq!(rec.a, "x");
        assert_eq!(rec.b, "y");
        assert_eq!(rec.n, 42);
        assert!(rec.flag);
        assert_eq!(
            prov.get("sec_n"),
            Some(&Source::File("<string> (line 5)".into()))
        );
    }

    #[test]
    fn empty_value_policies() {
        let (rec, prov) = load("a: \"\"\nsec:\n  b: ''\n");
        assert_eq!(rec.a, "");
        assert_eq!(rec.b, "beta");
        assert_eq!(prov.get("sec_b"), Some(&Source::Default));
    }

    #[test]
    fn unconvertible_value_keeps_default() {
        let (rec, prov) = load("flag: maybe\nsec:\n  n: lots\n");
        assert!(!rec.flag);
        assert_eq!(rec.n, 7);
        assert_eq!(prov.get("sec_n"), Some(&Source::Default));
    }

    #[test]
    fn booleans() {
        for s in ["true", "TRUE", "yes", "on", "1"] {
            assert!(parse_bool(s).unwrap(), "{s}");
        }
        for s in ["false", "No", "off", "0"] {
            assert!(!parse_bool(s).unwrap(), "{s}");
        }
        let _ = parse_bool("").unwrap_err();
        let _ = parse_u32("-1").unwrap_err();
    }

    #[test]
    fn table_shows_sources() {
        let (rec, prov) = load("sec:\n  n: 3\n");
        let out = table(FIELDS, &rec, &prov).to_string();
        assert!(out.contains("sec_n"));
        assert!(out.contains("<string> (line 2)"));
        assert!(out.contains("alpha"));
    }

    #[test]
    fn template_round_trip() {
        let text = template(FIELDS, &[("a", "")]);
        let (rec, _) = load(&text);
        assert_eq!(rec.a, "");
        assert_eq!(rec.b, "beta");
        assert_eq!(rec.n, 7);
        // top-level keys precede the section
        assert!(text.find("flag:").unwrap() < text.find("sec:").unwrap());
    }
}
