//! UCFG (Universal Configuration) parser and formatter.
//!
//! UCFG is a small, hand-editable configuration format made of nested named
//! sections and semicolon-terminated key/value lists:
//!
//! ```text
//! # Comments run to the end of the line.
//! name: "Example" 'site';
//!
//! server web (comments in parentheses (nest)) {
//!   listen: 0.0.0.0 8080;
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. **Scanner**: Pure routines that skip whitespace and comments and read
//!    quoted strings, escape sequences and bare identifiers at an offset.
//!
//! 2. **Parser**: A descent parser over the scanner that builds an
//!    ordered [`Section`] tree, tracking line and column for errors.
//!
//! 3. **Formatter**: Renders a tree back to canonical text that parses to an
//!    equal tree, or validates text by parsing it.

mod diagnostic;
mod encode;
mod error;
mod literal;
mod parser;
mod position;
mod scanner;
mod value;

pub use encode::{encode, encode_scalar, Formatter, Indent, Source};
pub use error::{ErrorKind, FormatError, ParseError, Result};
pub use literal::is_identifier;
pub use parser::{Parser, Status};
pub use value::{Entry, Scalar, Section};

/// Parse a UCFG document from a string.
///
/// # Example
///
/// ```
/// use libucfg::parse;
///
/// let root = parse("name: value;").unwrap();
/// assert_eq!(root.leaf("name").unwrap()[0].as_str(), Some("value"));
/// ```
pub fn parse(input: &str) -> Result<Section> {
    parse_with_filename(input, None)
}

/// Parse a UCFG document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Section> {
    let ctx = error::ParseContext::new(filename);
    parser::parse_root(input, ctx)
}

/// Format a tree as canonical text with an indent width of 1, 2, 3, 4 or 8.
///
/// # Example
///
/// ```
/// let root = libucfg::parse("a{}a{}").unwrap();
/// assert_eq!(libucfg::stringify(&root, 2).unwrap(), "a {\n}\n\na {\n}");
/// ```
pub fn stringify(root: &Section, indent: usize) -> std::result::Result<String, FormatError> {
    Formatter::new(root, indent)?.stringify()
}

/// Check that text parses, returning it unchanged.
pub fn validate(text: &str) -> std::result::Result<String, FormatError> {
    Formatter::with_indent(text, Indent::default()).stringify()
}
