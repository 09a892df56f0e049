//! Diagnostic rendering for parser errors.

use crate::error::{ErrorKind, ParseError};
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::ops::Range;

impl ParseError {
    /// Render this error with ariadne, without colors.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        let _ = self
            .build_report(filename, source, false)
            .finish()
            .write((filename, Source::from(source)), &mut output);
        String::from_utf8(output).unwrap_or_else(|_| self.to_string())
    }

    /// Write the colored error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let _ = self
            .build_report(filename, source, true)
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    /// Character range the report points at.
    fn span(&self, source: &str) -> Range<usize> {
        let len = source.chars().count();
        let start = self.offset().min(len);
        if start < len {
            start..start + 1
        } else {
            // Past the end: point at the last character.
            len.saturating_sub(1)..len
        }
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        source: &str,
        color: bool,
    ) -> ariadne::ReportBuilder<'static, (&'a str, Range<usize>)> {
        let range = self.span(source);
        let label = match self.kind {
            ErrorKind::String => "control characters must be escaped",
            ErrorKind::StringEscape => "unknown escape",
            ErrorKind::EscapeUnicode => "expected two hexadecimal digits",
            ErrorKind::UnexpectedToken => "unexpected",
            ErrorKind::UnexpectedEnd => "input ends here",
            ErrorKind::KeyExists => "key already defined in this section",
            ErrorKind::Number | ErrorKind::Ok => "here",
        };

        let report = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_config(Config::default().with_color(color))
            .with_message(self.kind.description())
            .with_label(
                Label::new((filename, range))
                    .with_message(label)
                    .with_color(Color::Red),
            );

        match self.kind {
            ErrorKind::String => report.with_help("use \\t, \\n or \\xHH inside double quotes"),
            ErrorKind::StringEscape => {
                report.with_help("valid escapes are: \\\", \\\\, \\n, \\r, \\t, \\xHH")
            }
            ErrorKind::UnexpectedToken => {
                report.with_help("entries are `key: value...;` or `key [value...] { ... }`")
            }
            ErrorKind::UnexpectedEnd => {
                report.with_help("close every string, comment, and section, and end leaves with ';'")
            }
            ErrorKind::KeyExists => report.with_help(
                "a leaf key must appear only once per section, and cannot also name a subsection",
            ),
            _ => report,
        }
    }
}
