//! Source tokens and positions
//!
//! Every value retained by the model keeps the raw text it was parsed from
//! and the place it was found, so diagnostics can point at a file and line.
//!
//! @c4-component SourceLocationMapper
//! @c4-container tfcheck Core
//! @c4-responsibility Convert byte offsets to line/column positions

use std::fmt;
use std::ops::Range;

use hcl_edit::expr::Expression;
use serde_derive::Serialize;

/// A position inside a source file.
///
/// A position with an empty `filename` is unknown: the value it belongs to
/// was not read from a file (for example a `--var` assignment).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Pos {
    pub filename: String,
    /// Byte offset (0-based)
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
}

impl Pos {
    pub fn new(filename: impl Into<String>, offset: usize, line: usize, column: usize) -> Self {
        Self { filename: filename.into(), offset, line, column }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        !self.filename.is_empty() && self.line > 0
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}:{}", self.filename, self.line, self.column)
        } else {
            f.write_str("<unknown>")
        }
    }
}

/// Syntactic category of a token's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    String,
    Number,
    Bool,
    Null,
    /// A quoted string containing `${...}` or `%{...}` sequences
    Template,
    /// Anything else: traversals, function calls, operators...
    Expression,
}

impl TokenKind {
    pub fn of(expr: &Expression) -> Self {
        match expr {
            Expression::String(_) => TokenKind::String,
            Expression::Number(_) => TokenKind::Number,
            Expression::Bool(_) => TokenKind::Bool,
            Expression::Null(_) => TokenKind::Null,
            Expression::StringTemplate(_) | Expression::HeredocTemplate(_) => TokenKind::Template,
            _ => TokenKind::Expression,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, TokenKind::String | TokenKind::Number | TokenKind::Bool | TokenKind::Null)
    }
}

/// An opaque lexical unit: raw source text plus where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, pos: Pos) -> Self {
        Self { kind, text: text.into(), pos }
    }

    /// Builds a string token holding `value` verbatim, with no source position.
    ///
    /// The value is quoted and escaped so that the evaluator reads it back
    /// unchanged, including any `${` sequence it may contain.
    pub fn string_literal(value: &str) -> Self {
        let escaped = value.replace("${", "$${").replace("%{", "%%{");
        let text = serde_json::to_string(&escaped).unwrap_or_else(|_| format!("\"{}\"", escaped));
        Self { kind: TokenKind::String, text, pos: Pos::unknown() }
    }

    /// Returns the same token moved to `pos`.
    pub fn at(mut self, pos: &Pos) -> Self {
        self.pos = pos.clone();
        self
    }
}

/// Maps byte offsets of one source file to line/column positions
pub struct SourceMapper<'a> {
    filename: &'a str,
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMapper<'a> {
    pub fn new(filename: &'a str, source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { filename, source, line_starts }
    }

    pub fn filename(&self) -> &str {
        self.filename
    }

    /// Convert a byte offset to line and column (1-based)
    pub fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = self.line_starts[line_index];
        let column = self
            .source
            .get(line_start..offset.min(self.source.len()))
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        (line_index + 1, column + 1)
    }

    pub fn pos_at(&self, offset: usize) -> Pos {
        let (line, column) = self.offset_to_position(offset);
        Pos::new(self.filename, offset, line, column)
    }

    /// Position of the start of a span, or unknown if the parser gave none
    pub fn span_to_pos(&self, span: Option<&Range<usize>>) -> Pos {
        span.map(|span| self.pos_at(span.start)).unwrap_or_default()
    }

    /// Raw source text covered by a span
    pub fn slice(&self, span: &Range<usize>) -> Option<&'a str> {
        self.source.get(span.clone())
    }
}
