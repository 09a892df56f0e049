//! Encode UCFG trees and scalars to canonical text.
//!
//! The canonical form puts one entry per line, indents nested sections by a
//! fixed width, separates sibling sections that share a key with a blank
//! line, and quotes only strings that cannot be written bare.

use crate::error::{FormatError, ParseContext};
use crate::literal;
use crate::parser::parse_root;
use crate::value::{Entry, Scalar, Section};
use std::fmt::Write;
use tracing::debug;

/// Indentation width of nested sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    One = 1,
    #[default]
    Two = 2,
    Three = 3,
    Four = 4,
    Eight = 8,
}

impl Indent {
    /// Number of spaces per nesting level.
    pub fn width(self) -> usize {
        self as usize
    }
}

impl TryFrom<usize> for Indent {
    type Error = FormatError;

    fn try_from(width: usize) -> Result<Self, Self::Error> {
        match width {
            1 => Ok(Indent::One),
            2 => Ok(Indent::Two),
            3 => Ok(Indent::Three),
            4 => Ok(Indent::Four),
            8 => Ok(Indent::Eight),
            _ => Err(FormatError::UnsupportedIndent(width)),
        }
    }
}

/// What a [`Formatter`] renders.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// A document tree.
    Tree(&'a Section),
    /// A single scalar.
    Scalar(&'a Scalar),
    /// Text that is only validated by parsing it.
    Text(&'a str),
}

impl<'a> From<&'a Section> for Source<'a> {
    fn from(section: &'a Section) -> Self {
        Source::Tree(section)
    }
}

impl<'a> From<&'a Scalar> for Source<'a> {
    fn from(scalar: &'a Scalar) -> Self {
        Source::Scalar(scalar)
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Source::Text(text)
    }
}

/// Renders one source to canonical text.
pub struct Formatter<'a> {
    source: Source<'a>,
    indent: Indent,
    depth: usize,
    output: String,
}

impl<'a> Formatter<'a> {
    /// Create a formatter with an indent width of 1, 2, 3, 4 or 8 spaces.
    pub fn new(source: impl Into<Source<'a>>, indent: usize) -> Result<Self, FormatError> {
        Ok(Self::with_indent(source, Indent::try_from(indent)?))
    }

    pub fn with_indent(source: impl Into<Source<'a>>, indent: Indent) -> Self {
        Self {
            source: source.into(),
            indent,
            depth: 0,
            output: String::new(),
        }
    }

    /// Produce the canonical text.
    ///
    /// For [`Source::Text`] the input is parsed and returned unchanged.
    pub fn stringify(mut self) -> Result<String, FormatError> {
        match self.source {
            Source::Text(text) => {
                debug!(chars = text.len(), "validating");
                parse_root(text, ParseContext::default())?;
                Ok(text.to_string())
            }
            Source::Scalar(scalar) => {
                self.stringify_scalar(scalar);
                Ok(self.output)
            }
            Source::Tree(root) => {
                debug!(keys = root.len(), indent = self.indent.width(), "formatting");
                self.stringify_section(root)?;
                Ok(self.output)
            }
        }
    }

    fn stringify_indent(&mut self) {
        let width = self.depth * self.indent.width();
        self.output.extend(std::iter::repeat(' ').take(width));
    }

    /// Write a key or string value, bare when it is an identifier.
    fn stringify_string_any(&mut self, s: &str) {
        if literal::is_identifier(s) {
            self.output.push_str(s);
        } else {
            encode_string(&mut self.output, s);
        }
    }

    fn stringify_scalar(&mut self, scalar: &Scalar) {
        match scalar {
            Scalar::String(s) => self.stringify_string_any(s),
            Scalar::Integer(n) => self.output.push_str(&literal::integer(n)),
            Scalar::Float(f) => self.output.push_str(&literal::float(*f)),
            Scalar::Bool(b) => self.output.push_str(literal::boolean(*b)),
            Scalar::Null => self.output.push_str(literal::NULL),
            Scalar::Absent => self.output.push_str(literal::ABSENT),
        }
    }

    fn stringify_values(&mut self, values: &[Scalar]) {
        for (i, value) in values.iter().enumerate() {
            if i != 0 {
                self.output.push(' ');
            }
            self.stringify_scalar(value);
        }
    }

    /// `key: v1 v2;`
    fn stringify_leaf(&mut self, key: &str, values: &[Scalar]) -> Result<(), FormatError> {
        if values.is_empty() {
            return Err(FormatError::EmptyLeaf(key.to_string()));
        }
        self.stringify_indent();
        self.stringify_string_any(key);
        self.output.push_str(": ");
        self.stringify_values(values);
        self.output.push(';');
        Ok(())
    }

    /// `key header... {`
    fn begin_section(&mut self, key: &str, header: &[Scalar]) {
        self.stringify_indent();
        self.stringify_string_any(key);
        self.output.push(' ');
        if !header.is_empty() {
            self.stringify_values(header);
            self.output.push(' ');
        }
        self.output.push_str("{\n");
        self.depth += 1;
    }

    fn end_section(&mut self, empty: bool) {
        self.depth -= 1;
        if !empty {
            self.output.push('\n');
        }
        self.stringify_indent();
        self.output.push('}');
    }

    /// Write the entries of `root`, descending into subsections through an
    /// explicit stack of frames.
    fn stringify_section(&mut self, root: &Section) -> Result<(), FormatError> {
        let mut stack = vec![Frame::new(root)];
        while let Some(frame) = stack.last_mut() {
            let section = frame.section;
            let Some((key, entry)) = section.entry_at(frame.entry) else {
                stack.pop();
                if !stack.is_empty() {
                    self.end_section(section.is_empty());
                }
                continue;
            };
            match entry {
                Entry::Leaf(values) => {
                    if frame.entry != 0 {
                        self.output.push('\n');
                    }
                    frame.entry += 1;
                    self.stringify_leaf(key, values)?;
                }
                Entry::Sections(siblings) => match siblings.get(frame.sibling) {
                    Some(child) => {
                        if frame.sibling != 0 {
                            self.output.push_str("\n\n");
                        } else if frame.entry != 0 {
                            self.output.push('\n');
                        }
                        frame.sibling += 1;
                        self.begin_section(key, child.header());
                        stack.push(Frame::new(child));
                    }
                    None => {
                        frame.entry += 1;
                        frame.sibling = 0;
                    }
                },
            }
        }
        Ok(())
    }
}

/// Progress through one section being written.
struct Frame<'s> {
    section: &'s Section,
    /// Index of the entry being written.
    entry: usize,
    /// Index of the next sibling within a subsection entry.
    sibling: usize,
}

impl<'s> Frame<'s> {
    fn new(section: &'s Section) -> Self {
        Self {
            section,
            entry: 0,
            sibling: 0,
        }
    }
}

/// Append `s` as a double quoted string.
fn encode_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            c if literal::is_control(c) => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Encode a document tree with the given indent.
pub fn encode(root: &Section, indent: Indent) -> Result<String, FormatError> {
    Formatter::with_indent(root, indent).stringify()
}

/// Encode a single scalar.
pub fn encode_scalar(scalar: &Scalar) -> String {
    let mut formatter = Formatter::with_indent(scalar, Indent::default());
    formatter.stringify_scalar(scalar);
    formatter.output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use num_bigint::BigInt;

    fn format(input: &str, indent: usize) -> String {
        let root = Parser::new(input).parse().unwrap();
        Formatter::new(&root, indent).unwrap().stringify().unwrap()
    }

    #[test]
    fn test_leaf_with_identifiers() {
        assert_eq!(format(r#"name: "A" 'B';"#, 2), "name: A B;");
    }

    #[test]
    fn test_leaf_with_quoted_values() {
        assert_eq!(
            format(r#"msg: "hello world" 'a;b' "";"#, 2),
            r#"msg: "hello world" "a;b" "";"#
        );
    }

    #[test]
    fn test_sibling_sections() {
        assert_eq!(format("a{}a{}", 2), "a {\n}\n\na {\n}");
    }

    #[test]
    fn test_nested_sections() {
        let input = "server web { port: 80; tls { cert: a.pem; } } log: info;";
        assert_eq!(
            format(input, 2),
            "server web {\n  port: 80;\n  tls {\n    cert: a.pem;\n  }\n}\nlog: info;"
        );
    }

    #[test]
    fn test_indent_widths() {
        assert_eq!(format("a { b: c; }", 1), "a {\n b: c;\n}");
        assert_eq!(format("a { b: c; }", 3), "a {\n   b: c;\n}");
        assert_eq!(format("a { b: c; }", 4), "a {\n    b: c;\n}");
        assert_eq!(format("a { b: c; }", 8), "a {\n        b: c;\n}");
    }

    #[test]
    fn test_unsupported_indent() {
        let root = Section::new();
        for width in [0, 5, 6, 7, 9, 16] {
            assert!(matches!(
                Formatter::new(&root, width),
                Err(FormatError::UnsupportedIndent(w)) if w == width
            ));
        }
    }

    #[test]
    fn test_string_escapes() {
        let mut out = String::new();
        encode_string(&mut out, "q\"b\\t\tn\nr\re\x1bd\x7f");
        assert_eq!(out, r#""q\"b\\t\tn\nr\x0de\x1bd\x7f""#);
    }

    #[test]
    fn test_quoted_key() {
        assert_eq!(format("\"my key\": v;", 2), "\"my key\": v;");
        assert_eq!(format("'': v;", 2), "\"\": v;");
    }

    #[test]
    fn test_header_values_quoted_when_needed() {
        assert_eq!(
            format("host \"a b\" c {}", 4),
            "host \"a b\" c {\n}"
        );
    }

    #[test]
    fn test_typed_scalars() {
        let mut root = Section::new();
        root.set_leaf(
            "mixed",
            vec![
                Scalar::from(42i64),
                Scalar::from(2.5),
                Scalar::from(true),
                Scalar::Null,
                Scalar::Absent,
                Scalar::Integer("99999999999999999999".parse::<BigInt>().unwrap()),
            ],
        );
        assert_eq!(
            encode(&root, Indent::Two).unwrap(),
            "mixed: 42 2.5 true null none 99999999999999999999;"
        );
    }

    #[test]
    fn test_single_scalar() {
        assert_eq!(encode_scalar(&Scalar::from("plain")), "plain");
        assert_eq!(encode_scalar(&Scalar::from("needs quotes")), "\"needs quotes\"");
        assert_eq!(encode_scalar(&Scalar::Float(f64::NAN)), "NaN");
        let out = Formatter::new(&Scalar::from(false), 2)
            .unwrap()
            .stringify()
            .unwrap();
        assert_eq!(out, "false");
    }

    #[test]
    fn test_empty_leaf_is_rejected() {
        let mut root = Section::new();
        root.set_leaf("nothing", Vec::new());
        assert!(matches!(
            encode(&root, Indent::Two),
            Err(FormatError::EmptyLeaf(key)) if key == "nothing"
        ));
    }

    #[test]
    fn test_validate_text() {
        let text = "a   :   b ;  # untouched";
        let out = Formatter::new(text, 2).unwrap().stringify().unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_validate_rejects_invalid_text() {
        let result = Formatter::new("a: ;", 2).unwrap().stringify();
        assert!(matches!(result, Err(FormatError::Invalid(e)) if e.column == 4));
    }

    fn nested(depth: usize) -> Section {
        let input = format!("{}{}", "a{".repeat(depth), "}".repeat(depth));
        Parser::new(&input).parse().unwrap()
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 10_000;
        let text = encode(&nested(depth), Indent::One).unwrap();
        assert_eq!(text.lines().count(), 2 * depth);
        assert!(text.starts_with("a {\n a {\n  a {\n"));
        assert!(text.ends_with("\n  }\n }\n}"));
    }

    #[test]
    fn test_deep_output_reparses_equal() {
        let root = nested(2_000);
        let text = encode(&root, Indent::Two).unwrap();
        assert!(Parser::new(&text).parse().unwrap() == root);
    }

    #[test]
    fn test_output_reparses_equal() {
        let input = "# config\nname: \"x\\ty\" 'z';\nsrv a { p: 1; }\nsrv b { q { r: \"\\x01\"; } }\n";
        let first = Parser::new(input).parse().unwrap();
        let text = encode(&first, Indent::Four).unwrap();
        let second = Parser::new(&text).parse().unwrap();
        assert_eq!(first, second);
    }
}
