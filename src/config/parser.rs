//! File parsing internals
// (c) 2024 Ross Younger

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
};

use tracing::trace;

use super::lines::{classify, normalize_line, normalize_value, Line};
use super::Pairs;

/// The business end of reading a configuration or preset file.
///
/// # Note
/// You can only use this struct once. If for some reason you want to re-parse a file,
/// you must create a fresh `Parser` to do so.
#[derive(Debug)]
pub struct Parser<R>
where
    R: Read,
{
    line_number: usize,
    reader: BufReader<R>,
    path: Option<PathBuf>,
}

impl Parser<File> {
    /// Opens a file for parsing.
    ///
    /// The caller decides what a missing file means; the `io::Error` is returned unchanged
    /// so its [`kind()`](std::io::Error::kind) can be inspected.
    pub fn for_path<P>(path: P) -> std::io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::for_reader(BufReader::new(file), Some(path.to_path_buf())))
    }
}

impl<'a> Parser<&'a [u8]> {
    /// Parses from a string
    #[must_use]
    pub fn for_str(s: &'a str) -> Self {
        Self::for_reader(BufReader::new(s.as_bytes()), None)
    }
}

impl Default for Parser<&[u8]> {
    fn default() -> Self {
        Parser::for_str("")
    }
}

impl<R: Read> Parser<R> {
    /// Wraps an arbitrary reader
    #[must_use]
    pub fn for_reader(reader: BufReader<R>, path: Option<PathBuf>) -> Self {
        Self {
            line_number: 0,
            reader,
            path,
        }
    }

    /// Applies a single line to the output.
    /// Returns the section that is active after the line.
    fn step(&self, section: Option<String>, raw: &str, output: &mut Pairs) -> Option<String> {
        let Some(line) = normalize_line(raw) else {
            return section;
        };
        match classify(line) {
            Line::Section(name) => Some(name.to_owned()),
            Line::Entry {
                indented: true,
                key,
                raw_value,
            } => {
                if let Some(s) = &section {
                    output.push(
                        format!("{s}_{key}"),
                        normalize_value(raw_value),
                        self.line_number,
                    );
                } else {
                    trace!(
                        "line {}: indented key `{key}` outside any section, ignored",
                        self.line_number
                    );
                }
                section
            }
            Line::Entry {
                indented: false,
                key,
                raw_value,
            } => {
                output.push(key.to_owned(), normalize_value(raw_value), self.line_number);
                None
            }
            Line::Ignored => {
                trace!(
                    "line {}: not understood, ignored: {line:?}",
                    self.line_number
                );
                section
            }
        }
    }

    /// Reads the whole source in a single pass.
    /// This consumes the `Parser`.
    ///
    /// Lines that don't fit the format are skipped; the only errors are I/O errors.
    /// Bytes that are not valid UTF-8 are replaced, so they can only spoil the line they are on.
    pub fn parse(mut self) -> std::io::Result<Pairs> {
        let mut output = Pairs::new(self.path.take());
        let mut section: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if 0 == self.reader.read_until(b'\n', &mut buf)? {
                break; // EOF
            }
            self.line_number += 1;
            let line = String::from_utf8_lossy(&buf);
            section = self.step(section, &line, &mut output);
        }
        Ok(output)
    }
}

/// Parses the contents of a reader into a sequence of pairs
pub fn parse<R: Read>(reader: R) -> std::io::Result<Pairs> {
    Parser::for_reader(BufReader::new(reader), None).parse()
}

///////////////////////////////////////////////////////////////////////////////////////
