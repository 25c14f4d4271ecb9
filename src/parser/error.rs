use std::fmt;

use termion::color;
use thiserror::Error;

use super::spanned::{retrieve_span_snippet, Spanned};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unknown glyph `{0}`")]
    UnknownGlyph(String),

    #[error("{glyph} needs {expected} after it")]
    MissingOperand {
        glyph: &'static str,
        expected: &'static str,
    },

    #[error("invalid number `{0}`, numbers must be whole and between {min} and {max}", min = i64::MIN, max = i64::MAX)]
    InvalidLiteral(String),

    #[error("invalid label name `{0}`, labels use letters, digits and `_` and must not start with a digit")]
    InvalidLabel(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no label named `{0}` is defined")]
    UnresolvedLabel(String),

    #[error("label `{name}` is already defined on line {first_line}")]
    DuplicateLabel { name: String, first_line: usize },

    #[error("malformed instruction: {0}")]
    MalformedInstruction(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SyntaxErrorItem {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Every lex and parse error found in one source text, in source order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    errors: Vec<Spanned<SyntaxErrorItem>>,
}

impl SyntaxError {
    pub fn new(mut errors: Vec<Spanned<SyntaxErrorItem>>) -> Self {
        errors.sort_by_key(|err| err.span.start);

        Self { errors }
    }

    pub fn errors(&self) -> &[Spanned<SyntaxErrorItem>] {
        &self.errors
    }

    pub fn first(&self) -> Option<&Spanned<SyntaxErrorItem>> {
        self.errors.first()
    }

    pub fn is_lex_error(&self) -> bool {
        self.errors
            .iter()
            .any(|err| matches!(err.item, SyntaxErrorItem::Lex(_)))
    }

    /// Plain-text report with the offending line and a caret marker under each error.
    pub fn render(&self, source: &str) -> String {
        self.render_inner(source, false)
    }

    /// Same as `render` with terminal colors.
    pub fn render_colored(&self, source: &str) -> String {
        self.render_inner(source, true)
    }

    fn render_inner(&self, source: &str, colored: bool) -> String {
        let mut out = String::new();

        for err in self.errors.iter() {
            let heading = format!(
                "SYNTAX ERROR: line {}, column {}",
                err.span.line, err.span.column
            );

            if colored {
                out.push_str(&format!(
                    "{}{}{}\n",
                    color::Fg(color::Red),
                    heading,
                    color::Fg(color::Reset)
                ));
            } else {
                out.push_str(&heading);
                out.push('\n');
            }

            if let Some(snippet) = retrieve_span_snippet(source, err.span) {
                out.push_str(&snippet.source_line);
                out.push('\n');
                out.push_str(&" ".repeat(snippet.offset));
                out.push_str(&"^".repeat(snippet.width));
                out.push('\n');
            }

            out.push_str(&err.item.to_string());
            out.push('\n');
        }

        out
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "line {}, column {}: {}",
                err.span.line, err.span.column, err.item
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for SyntaxError {}
