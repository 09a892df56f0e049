//! Error types for UCFG parsing and formatting.

use std::fmt;
use thiserror::Error;

/// Result type for UCFG parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self) -> String {
        match &self.filename {
            Some(name) => format!(" of <{}>", name),
            None => String::new(),
        }
    }
}

/// Kind of failure reported by the parser.
///
/// The discriminants are stable numeric status codes; `Ok` is the status of a
/// parse that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No error.
    Ok = 0,
    /// Malformed number. Reserved for typed layers built on top of the parser.
    Number = 1,
    /// Raw control character inside a quoted string.
    String = 2,
    /// Unknown escape letter after `\`.
    StringEscape = 3,
    /// Non-hexadecimal digit in a `\x` escape.
    EscapeUnicode = 4,
    /// Grammar violation.
    UnexpectedToken = 5,
    /// Input ended in the middle of a construct.
    UnexpectedEnd = 6,
    /// Leaf key defined twice in one section.
    KeyExists = 7,
}

impl ErrorKind {
    /// Numeric status code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Ok => "OK",
            ErrorKind::Number => "Number",
            ErrorKind::String => "String",
            ErrorKind::StringEscape => "Escape",
            ErrorKind::EscapeUnicode => "Unicode",
            ErrorKind::UnexpectedToken => "Token",
            ErrorKind::UnexpectedEnd => "End",
            ErrorKind::KeyExists => "Key",
        }
    }

    /// Human readable description.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::Ok => "no error",
            ErrorKind::Number => "invalid number",
            ErrorKind::String => "illegal character in string",
            ErrorKind::StringEscape => "unknown escape sequence",
            ErrorKind::EscapeUnicode => "invalid hexadecimal escape",
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::UnexpectedEnd => "unexpected end of input",
            ErrorKind::KeyExists => "duplicate key",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parse failure with its source location.
///
/// `line`, `column` and `position` are 1-based; `position` counts characters
/// from the start of the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{kind}] {line}:{column}{suffix}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub line: usize,
    pub column: usize,
    pub position: usize,
    suffix: String,
}

impl ParseError {
    /// Create an error at the given location.
    pub fn new(kind: ErrorKind, line: usize, column: usize, position: usize) -> Self {
        Self {
            kind,
            line,
            column,
            position,
            suffix: String::new(),
        }
    }

    /// Attach the filename from the parse context to the message.
    pub fn with_context(mut self, ctx: &ParseContext) -> Self {
        self.suffix = ctx.loc_suffix();
        self
    }

    /// Zero-based character offset of the failure.
    pub fn offset(&self) -> usize {
        self.position.saturating_sub(1)
    }
}

/// Error type for UCFG formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Indent width outside the supported set.
    #[error("Unsupported indent width {0} (expected 1, 2, 3, 4 or 8)")]
    UnsupportedIndent(usize),

    /// Leaf without values, which has no parseable rendering.
    #[error("Empty value list for key {0:?}")]
    EmptyLeaf(String),

    /// Text given for validation does not parse.
    #[error("Invalid document: {0}")]
    Invalid(#[from] ParseError),
}
