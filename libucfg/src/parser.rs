//! Section parser.
//!
//! A descent parser over the scanner routines. Section bodies nest through an
//! explicit stack of open sections: a `{` pushes the enclosing section and
//! the matching `}` pops it. The first failure is returned as an error, and
//! no partial tree escapes.

use crate::error::{ErrorKind, ParseContext, ParseError, Result};
use crate::position::{Location, Position};
use crate::scanner::{self, Fault};
use crate::value::{Scalar, Section};
use tracing::{debug, trace};

/// Outcome of the most recent parse, as reported by [`Parser::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub kind: ErrorKind,
    pub line: usize,
    pub column: usize,
    pub position: usize,
}

/// Parser for one UCFG document.
pub struct Parser {
    input: Vec<char>,
    ctx: ParseContext,
    offset: usize,
    pos: Position,
    depth: usize,
    status: Status,
}

impl Parser {
    /// Create a parser for the given text.
    pub fn new(input: &str) -> Self {
        Self::with_context(input, ParseContext::default())
    }

    /// Create a parser that names `filename` in error messages.
    pub fn with_filename(input: &str, filename: &str) -> Self {
        Self::with_context(input, ParseContext::new(Some(filename)))
    }

    fn with_context(input: &str, ctx: ParseContext) -> Self {
        Self {
            input: input.chars().collect(),
            ctx,
            offset: 0,
            pos: Position::new(),
            depth: 0,
            status: Status {
                kind: ErrorKind::Ok,
                line: 1,
                column: 1,
                position: 1,
            },
        }
    }

    /// Parse the whole input into the root section.
    ///
    /// State is reset first, so calling this again parses from the start.
    pub fn parse(&mut self) -> Result<Section> {
        self.offset = 0;
        self.pos = Position::new();
        self.depth = 0;

        debug!(chars = self.input.len(), "parsing");
        let result = self.parse_section();

        match &result {
            Ok(root) => {
                let loc = self.pos.locate(self.offset);
                self.status = Status {
                    kind: ErrorKind::Ok,
                    line: loc.line,
                    column: loc.column,
                    position: loc.position,
                };
                debug!(keys = root.len(), "parsed");
            }
            Err(e) => {
                self.status = Status {
                    kind: e.kind,
                    line: e.line,
                    column: e.column,
                    position: e.position,
                };
                debug!(error = %e, "parse failed");
            }
        }

        result
    }

    /// Error code and location of the last parse.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Nesting depth where the last parse stopped.
    ///
    /// Zero after a successful parse; after a failure, the number of
    /// sections that were still open.
    pub fn depth(&self) -> usize {
        self.depth
    }

    fn len(&self) -> usize {
        self.input.len()
    }

    /// Build an error at `offset` on the current line.
    fn fail(&self, kind: ErrorKind, offset: usize) -> ParseError {
        self.fail_at(kind, self.pos.locate(offset))
    }

    fn fail_at(&self, kind: ErrorKind, loc: Location) -> ParseError {
        let Location {
            line,
            column,
            position,
        } = loc;
        ParseError::new(kind, line, column, position).with_context(&self.ctx)
    }

    fn fault(&self, fault: Fault) -> ParseError {
        self.fail(fault.kind, fault.offset)
    }

    fn skip_whitespace(&mut self, idx: usize) -> Result<usize> {
        scanner::skip_whitespace(&self.input, idx, &mut self.pos).map_err(|f| self.fault(f))
    }

    /// Scan a key or value at `idx` and move past it.
    fn scan_value(&mut self, idx: usize) -> Result<String> {
        let (value, next) = scanner::scan_value(&self.input, idx).map_err(|f| self.fault(f))?;
        self.offset = next;
        Ok(value)
    }

    /// Bind a leaf, reporting `KeyExists` at `idx` if the key is taken.
    fn commit_leaf(
        &self,
        section: &mut Section,
        key: String,
        values: Vec<String>,
        idx: usize,
    ) -> Result<()> {
        trace!(key = %key, values = values.len(), "leaf");
        let values = values.into_iter().map(Scalar::String).collect();
        if section.set_leaf(key, values) {
            Ok(())
        } else {
            Err(self.fail(ErrorKind::KeyExists, idx))
        }
    }

    /// Parse entries until the end of input.
    ///
    /// Open sections live on an explicit stack, so nesting depth is bounded
    /// only by memory. A `{` saves the
    /// enclosing section with the pending key and header values; the
    /// matching `}` restores it and binds the finished child.
    fn parse_section(&mut self) -> Result<Section> {
        let len = self.len();
        let mut stack: Vec<OpenSection> = Vec::new();
        let mut section = Section::new();

        loop {
            let idx = self.skip_whitespace(self.offset)?;
            self.offset = idx;

            if idx == len {
                if !stack.is_empty() {
                    return Err(self.fail(ErrorKind::UnexpectedEnd, len));
                }
                return Ok(section);
            }

            if self.input[idx] == '}' {
                if let Some(open) = stack.pop() {
                    trace!(depth = self.depth, "close section");
                    self.depth -= 1;
                    self.offset = idx + 1;

                    let mut child = std::mem::replace(&mut section, open.parent);
                    child.set_header(open.header.into_iter().map(Scalar::String).collect());
                    if !section.push_section(open.key, child) {
                        return Err(self.fail_at(ErrorKind::KeyExists, open.brace));
                    }
                    continue;
                }
            }

            let key = self.scan_value(idx)?;
            let mut values: Vec<String> = Vec::new();
            let mut leaf = false;

            loop {
                let idx = self.skip_whitespace(self.offset)?;
                self.offset = idx;

                if idx == len {
                    // A leaf may omit its final `;` at the end of the root.
                    if !stack.is_empty() || !leaf || values.is_empty() {
                        return Err(self.fail(ErrorKind::UnexpectedEnd, len));
                    }
                    self.commit_leaf(&mut section, key, values, idx)?;
                    return Ok(section);
                }

                match self.input[idx] {
                    ':' => {
                        if leaf || !values.is_empty() {
                            return Err(self.fail(ErrorKind::UnexpectedToken, idx));
                        }
                        leaf = true;
                        self.offset = idx + 1;
                    }
                    '}' => return Err(self.fail(ErrorKind::UnexpectedToken, idx)),
                    '{' => {
                        if leaf {
                            return Err(self.fail(ErrorKind::UnexpectedToken, idx));
                        }
                        // Reported at the brace, ahead of any error in the body.
                        if section.has_leaf(&key) {
                            return Err(self.fail(ErrorKind::KeyExists, idx));
                        }

                        self.depth += 1;
                        self.offset = idx + 1;
                        trace!(key = %key, depth = self.depth, "open section");

                        stack.push(OpenSection {
                            key,
                            header: values,
                            brace: self.pos.locate(idx),
                            parent: std::mem::take(&mut section),
                        });
                        break;
                    }
                    ';' => {
                        if !leaf || values.is_empty() {
                            return Err(self.fail(ErrorKind::UnexpectedToken, idx));
                        }
                        self.commit_leaf(&mut section, key, values, idx)?;
                        self.offset = idx + 1;
                        break;
                    }
                    _ => {
                        let value = self.scan_value(idx)?;
                        values.push(value);
                    }
                }
            }
        }
    }
}

/// A section whose body is being parsed.
struct OpenSection {
    key: String,
    header: Vec<String>,
    /// Location of the `{`.
    brace: Location,
    /// The enclosing section, set aside until the matching `}`.
    parent: Section,
}

/// Parse a document with the given context.
pub fn parse_root(input: &str, ctx: ParseContext) -> Result<Section> {
    Parser::with_context(input, ctx).parse()
}
