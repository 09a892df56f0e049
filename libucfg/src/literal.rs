//! Scalar literal rules shared by the scanner and the formatter.
//!
//! Decides which strings may be written bare and how typed scalars are
//! spelled in canonical output.

use num_bigint::BigInt;

/// Check whether a character may appear in a bare identifier.
pub fn is_identifier_char(c: char) -> bool {
    !is_control(c)
        && !matches!(
            c,
            ' ' | '"'
                | '\''
                | '#'
                | '('
                | ')'
                | ','
                | ':'
                | ';'
                | '<'
                | '='
                | '>'
                | '['
                | '\\'
                | ']'
                | '{'
                | '}'
        )
}

/// Check whether a string can be written without quotes.
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_identifier_char)
}

/// Characters below U+0020 and U+007F.
pub fn is_control(c: char) -> bool {
    (c as u32) < 0x20 || c == '\x7f'
}

pub fn integer(n: &BigInt) -> String {
    n.to_string()
}

/// Canonical text of a float.
pub fn float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if f == 0.0 {
        // Covers negative zero too.
        "0".to_string()
    } else {
        format!("{}", f)
    }
}

pub fn boolean(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

pub const NULL: &str = "null";

pub const ABSENT: &str = "none";
