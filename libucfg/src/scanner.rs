//! Lexical scanner.
//!
//! Each routine starts at an offset into the input characters and returns
//! the scanned value together with the offset just past it. Nothing here
//! holds state between calls; the whitespace skipper records newlines into
//! the caller's [`Position`].
//!
//! - Whitespace: space, tab, CR and LF
//! - Comments: `# ...` to end of line, `( ... )` nesting
//! - Strings: `"..."` with escapes, `'...'` verbatim
//! - Identifiers: runs of [`is_identifier_char`]

use crate::error::ErrorKind;
use crate::literal::{is_control, is_identifier_char};
use crate::position::Position;

/// A scanner failure at a character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub kind: ErrorKind,
    pub offset: usize,
}

impl Fault {
    fn new(kind: ErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// A scanned value and the offset following it.
pub type Scan<T> = std::result::Result<(T, usize), Fault>;

/// Control characters that may not appear inside a comment.
/// Tab, LF and CR are allowed.
fn is_comment_forbidden(c: char) -> bool {
    is_control(c) && !matches!(c, '\t' | '\n' | '\r')
}

/// Skip whitespace and comments, returning the offset of the next
/// significant character (or the input length).
pub fn skip_whitespace(
    text: &[char],
    mut idx: usize,
    pos: &mut Position,
) -> std::result::Result<usize, Fault> {
    while let Some(&c) = text.get(idx) {
        match c {
            ' ' | '\t' | '\r' => idx += 1,
            '\n' => {
                idx += 1;
                pos.newline(idx);
            }
            '#' => idx = skip_comment_single(text, idx + 1),
            '(' => idx = skip_comment_multi(text, idx + 1, pos)?,
            _ => return Ok(idx),
        }
    }
    Ok(text.len())
}

/// Skip a `#` comment. Stops at the newline, which is left for the caller,
/// or at a forbidden control character.
fn skip_comment_single(text: &[char], idx: usize) -> usize {
    text[idx..]
        .iter()
        .position(|&c| c == '\n' || is_comment_forbidden(c))
        .map_or(text.len(), |n| idx + n)
}

/// Skip the body of a `(` comment, honoring nested parentheses.
fn skip_comment_multi(
    text: &[char],
    mut idx: usize,
    pos: &mut Position,
) -> std::result::Result<usize, Fault> {
    let mut depth = 1usize;

    while let Some(&c) = text.get(idx) {
        idx += 1;
        match c {
            '\n' => pos.newline(idx),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(idx);
                }
            }
            c if is_comment_forbidden(c) => {
                return Err(Fault::new(ErrorKind::UnexpectedEnd, idx - 1));
            }
            _ => {}
        }
    }

    Err(Fault::new(ErrorKind::UnexpectedEnd, text.len()))
}

/// Scan a key or value: quoted string or identifier, chosen by the first
/// character.
pub fn scan_value(text: &[char], idx: usize) -> Scan<String> {
    match text.get(idx) {
        Some('"') => scan_double(text, idx + 1),
        Some('\'') => scan_single(text, idx + 1),
        _ => scan_identifier(text, idx),
    }
}

/// Scan a double quoted string body starting just after the opening quote.
pub fn scan_double(text: &[char], mut idx: usize) -> Scan<String> {
    let mut result = String::new();

    loop {
        match text.get(idx) {
            None => return Err(Fault::new(ErrorKind::UnexpectedEnd, text.len())),
            Some('"') => return Ok((result, idx + 1)),
            Some('\\') => {
                let (c, next) = scan_escape(text, idx + 1)?;
                result.push(c);
                idx = next;
            }
            Some(&c) if is_control(c) => return Err(Fault::new(ErrorKind::String, idx)),
            Some(&c) => {
                result.push(c);
                idx += 1;
            }
        }
    }
}

/// Scan a single quoted string body starting just after the opening quote.
/// There are no escapes in single quoted strings.
pub fn scan_single(text: &[char], start: usize) -> Scan<String> {
    let rest = &text[start.min(text.len())..];
    match rest.iter().position(|&c| c == '\'' || is_control(c)) {
        None => Err(Fault::new(ErrorKind::UnexpectedEnd, text.len())),
        Some(n) if rest[n] == '\'' => Ok((rest[..n].iter().collect(), start + n + 1)),
        Some(n) => Err(Fault::new(ErrorKind::String, start + n)),
    }
}

/// Decode an escape sequence starting just after the backslash.
pub fn scan_escape(text: &[char], idx: usize) -> Scan<char> {
    let c = match text.get(idx) {
        Some(&c) => c,
        None => return Err(Fault::new(ErrorKind::UnexpectedEnd, text.len())),
    };

    let decoded = match c {
        'x' => return scan_hex_byte(text, idx + 1),
        '"' => '"',
        '\\' => '\\',
        // Both map to a line feed.
        'n' | 'r' => '\n',
        't' => '\t',
        _ => return Err(Fault::new(ErrorKind::StringEscape, idx)),
    };

    Ok((decoded, idx + 1))
}

/// Decode the two hex digits of a `\x` escape into a code point 0-255.
pub fn scan_hex_byte(text: &[char], start: usize) -> Scan<char> {
    if text.len().saturating_sub(start) < 2 {
        return Err(Fault::new(ErrorKind::UnexpectedEnd, text.len()));
    }

    match (text[start].to_digit(16), text[start + 1].to_digit(16)) {
        (Some(high), Some(low)) => {
            let byte = (high * 16 + low) as u8;
            Ok((char::from(byte), start + 2))
        }
        _ => Err(Fault::new(ErrorKind::EscapeUnicode, start)),
    }
}

/// Scan a bare identifier.
pub fn scan_identifier(text: &[char], start: usize) -> Scan<String> {
    if start >= text.len() {
        return Err(Fault::new(ErrorKind::UnexpectedEnd, text.len()));
    }

    let end = text[start..]
        .iter()
        .position(|&c| !is_identifier_char(c))
        .map_or(text.len(), |n| start + n);

    if end == start {
        return Err(Fault::new(ErrorKind::UnexpectedToken, start));
    }

    Ok((text[start..end].iter().collect(), end))
}
