//! Desired-state parser.
//!
//! Turns the lines of a redirects file into [`RedirectEntry`] values. Lines
//! that cannot be used are reported as [`Diagnostic`]s and skipped; parsing
//! always continues with the next line.
//!
//! File format, one rule per line:
//!
//! ```text
//! # comment
//! <key> <location> [ignored...]
//! ```

use crate::models::redirect::{KeyOptions, RedirectEntry, is_valid_location};
use std::fmt;
use std::iter::Enumerate;

/// Why a line was skipped or modified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Fewer than two fields; the line was skipped.
    MissingRedirect,
    /// The location has an unsupported scheme; the line was skipped.
    InvalidRedirect(String),
    /// Trailing fields were dropped; the entry was still produced.
    ExtraFields(Vec<String>),
}

/// A per-line problem report, tagged with the 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::MissingRedirect => {
                write!(f, "Ignoring line {}, missing redirect field", self.line)
            }
            DiagnosticKind::InvalidRedirect(loc) => {
                write!(f, "Ignoring line {}, invalid redirect: {}", self.line, loc)
            }
            DiagnosticKind::ExtraFields(extra) => write!(
                f,
                "Ignoring extra fields in line {}: {}",
                self.line,
                extra.join(" ")
            ),
        }
    }
}

/// Output of the parser, in input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseEvent {
    Entry(RedirectEntry),
    Diagnostic(Diagnostic),
}

/// Lazy, single-pass parser over raw lines.
pub struct RedirectParser<I> {
    lines: Enumerate<I>,
    options: KeyOptions,
    // entry held back while its extra-fields diagnostic is yielded first
    pending: Option<RedirectEntry>,
}

/// Parse `lines` with the given key normalization options.
pub fn parse<I, S>(lines: I, options: KeyOptions) -> RedirectParser<I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    RedirectParser {
        lines: lines.into_iter().enumerate(),
        options,
        pending: None,
    }
}

impl<I, S> RedirectParser<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    /// Drop diagnostics into `on_diagnostic` and yield only the entries.
    ///
    /// The callback runs synchronously as each line is consumed, so
    /// diagnostics stay interleaved with whatever the consumer does per entry.
    pub fn entries<F>(self, mut on_diagnostic: F) -> impl Iterator<Item = RedirectEntry>
    where
        F: FnMut(Diagnostic),
    {
        self.filter_map(move |event| match event {
            ParseEvent::Entry(entry) => Some(entry),
            ParseEvent::Diagnostic(diag) => {
                on_diagnostic(diag);
                None
            }
        })
    }

    fn parse_line(&mut self, index: usize, raw: &str) -> Option<ParseEvent> {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        let (raw_key, location) = match words.as_slice() {
            [key, location, ..] => (*key, *location),
            _ => {
                return Some(ParseEvent::Diagnostic(Diagnostic {
                    line: line_no,
                    kind: DiagnosticKind::MissingRedirect,
                }));
            }
        };

        if !is_valid_location(location) {
            return Some(ParseEvent::Diagnostic(Diagnostic {
                line: line_no,
                kind: DiagnosticKind::InvalidRedirect(location.to_string()),
            }));
        }

        let entry = RedirectEntry::new(self.options.clean_key_name(raw_key), location);
        let extra = words.get(2..).unwrap_or_default();
        if extra.is_empty() {
            return Some(ParseEvent::Entry(entry));
        }

        self.pending = Some(entry);
        Some(ParseEvent::Diagnostic(Diagnostic {
            line: line_no,
            kind: DiagnosticKind::ExtraFields(extra.iter().map(|s| s.to_string()).collect()),
        }))
    }
}

impl<I, S> Iterator for RedirectParser<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = ParseEvent;

    fn next(&mut self) -> Option<ParseEvent> {
        if let Some(entry) = self.pending.take() {
            return Some(ParseEvent::Entry(entry));
        }
        loop {
            let (index, raw) = self.lines.next()?;
            if let Some(event) = self.parse_line(index, raw.as_ref()) {
                return Some(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> (Vec<(String, String)>, Vec<Diagnostic>) {
        let mut diags = Vec::new();
        let entries = parse(input.lines(), KeyOptions::default())
            .entries(|d| diags.push(d))
            .map(|e| (e.key, e.location))
            .collect();
        (entries, diags)
    }

    fn pair(k: &str, l: &str) -> (String, String) {
        (k.to_string(), l.to_string())
    }

    #[test]
    fn parse_basic() {
        let (entries, diags) = run("key/name /redirect/location");
        assert_eq!(entries, vec![pair("key/name", "/redirect/location")]);
        assert!(diags.is_empty());
    }

    #[test]
    fn parse_ignores_comments_and_blanks() {
        let (entries, diags) = run("\n\n#comment\n key/name /redirect/location \n#comment\n");
        assert_eq!(entries, vec![pair("key/name", "/redirect/location")]);
        assert!(diags.is_empty());
    }

    #[test]
    fn parse_missing_redirect() {
        let (entries, diags) = run("foo");
        assert!(entries.is_empty());
        assert_eq!(
            diags,
            vec![Diagnostic {
                line: 1,
                kind: DiagnosticKind::MissingRedirect
            }]
        );
        assert_eq!(diags[0].to_string(), "Ignoring line 1, missing redirect field");
    }

    #[test]
    fn parse_invalid_redirect() {
        let (entries, diags) = run("foo ftp://bar");
        assert!(entries.is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].to_string(),
            "Ignoring line 1, invalid redirect: ftp://bar"
        );
    }

    #[test]
    fn parse_extra_fields() {
        let (entries, diags) = run("foo /bar baz qux");
        assert_eq!(entries, vec![pair("foo", "/bar")]);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].to_string(),
            "Ignoring extra fields in line 1: baz qux"
        );
    }

    #[test]
    fn parse_normalizes_keys() {
        let (entries, _) = run("/old/ https://example.com/new\n/page.html /page2.html");
        assert_eq!(
            entries,
            vec![
                pair("old/index.html", "https://example.com/new"),
                pair("page.html", "/page2.html"),
            ]
        );
    }

    #[test]
    fn root_key_normalizes_to_empty_name() {
        let (entries, diags) = run("/ https://example.com/");
        assert_eq!(entries, vec![pair("", "https://example.com/")]);
        assert!(diags.is_empty());
    }

    #[test]
    fn line_numbers_count_skipped_lines() {
        let (entries, diags) = run("# header\n\na /b\nbroken\nc gopher://d\n");
        assert_eq!(entries, vec![pair("a", "/b")]);
        let lines: Vec<usize> = diags.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![4, 5]);
    }

    #[test]
    fn events_keep_input_order() {
        let events: Vec<ParseEvent> =
            parse(["a /b extra", "c /d"], KeyOptions::default()).collect();
        assert_eq!(
            events,
            vec![
                ParseEvent::Diagnostic(Diagnostic {
                    line: 1,
                    kind: DiagnosticKind::ExtraFields(vec!["extra".into()]),
                }),
                ParseEvent::Entry(RedirectEntry::new("a", "/b")),
                ParseEvent::Entry(RedirectEntry::new("c", "/d")),
            ]
        );
    }

    #[test]
    fn custom_key_options_apply() {
        let opts = KeyOptions {
            remove_slash: false,
            index: String::new(),
        };
        let entries: Vec<RedirectEntry> = parse(["/dir/ /x"], opts).entries(|_| {}).collect();
        assert_eq!(entries, vec![RedirectEntry::new("/dir/", "/x")]);
    }
}
