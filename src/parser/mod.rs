mod error;
mod lexer;
mod parser;
mod spanned;
mod token;

pub use error::{LexError, ParseError, SyntaxError, SyntaxErrorItem};
pub use lexer::{tokenize, LexResult, Lexer};
pub use parser::{parse, Parser};
pub use spanned::{retrieve_span_snippet, Span, SpanSnippet, Spanned};
pub(crate) use spanned::display_width;
pub use token::Token;

use tracing::debug;

use crate::bytecode::Program;

/// Lexes and parses `source`. Lex errors stop before parsing starts.
pub fn parse_program(source: &str) -> Result<Program, SyntaxError> {
    let tokens = tokenize(source).map_err(|errs| {
        debug!(errors = errs.len(), "lexing failed");

        SyntaxError::new(errs.into_iter().map(|e| e.map(Into::into)).collect())
    })?;

    let program = parse(&tokens).map_err(|errs| {
        debug!(errors = errs.len(), "parsing failed");

        SyntaxError::new(errs)
    })?;

    debug!(
        tokens = tokens.len(),
        instructions = program.len(),
        labels = program.labels().len(),
        "program parsed"
    );

    Ok(program)
}

#[cfg(test)]
mod tests;
