use core::iter::Peekable;

use unicode_segmentation::{GraphemeIndices, UnicodeSegmentation};

use super::error::LexError;
use super::spanned::{Span, Spanned};
use super::token::Token;
use crate::bytecode::{Arity, Glyph};

const COMMENT_START: &str = ";";
const BYTE_ORDER_MARK: &str = "\u{FEFF}";

pub type LexResult = Result<Spanned<Token>, Spanned<LexError>>;

/// Splits EmojiASM source into tokens, one grapheme cluster at a time.
///
/// The lexer knows the arity of every glyph, so the operand after an opcode
/// is lexed as the right kind of token, and a missing one is reported here.
pub struct Lexer<'a> {
    graphemes: Peekable<GraphemeIndices<'a>>,
    input: &'a str,
    line: usize,
    column: usize,
    pending: Option<LexResult>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut graphemes = input.grapheme_indices(true).peekable();

        // editors may save a byte order mark; it is not part of the program
        graphemes.next_if(|(_, g)| *g == BYTE_ORDER_MARK);

        Self {
            graphemes,
            input,
            line: 1,
            column: 1,
            pending: None,
        }
    }

    pub fn get_input(&self) -> &str {
        self.input
    }

    pub fn pos(&mut self) -> usize {
        self.graphemes
            .peek()
            .map(|(i, _)| *i)
            .unwrap_or(self.input.len())
    }

    pub fn eof(&mut self) -> bool {
        self.graphemes.peek().is_none()
    }

    fn advance(&mut self) -> Option<(usize, &'a str)> {
        let (i, g) = self.graphemes.next()?;

        if g.contains('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some((i, g))
    }

    fn here(&mut self) -> Span {
        let pos = self.pos();

        Span::new(pos, pos, self.line, self.column)
    }

    fn skip_ignored_input(&mut self) {
        loop {
            match self.graphemes.peek() {
                Some((_, g)) if is_whitespace(g) => {
                    self.advance();
                }
                Some((_, g)) if *g == COMMENT_START => {
                    while let Some((_, g)) = self.graphemes.peek() {
                        if g.contains('\n') {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn lex_token(&mut self) -> Option<LexResult> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }

        self.skip_ignored_input();

        let start = self.here();
        let (_, g) = *self.graphemes.peek()?;

        if is_word_char(g) {
            let (word, span) = self.lex_word(start);

            return Some(stray_word(word, span));
        }

        self.advance();
        let span = Span { end: self.pos(), ..start };

        let Some(glyph) = Glyph::lookup(g) else {
            return Some(Err(Spanned::new(
                LexError::UnknownGlyph(g.to_string()),
                span,
            )));
        };

        let token = match glyph {
            Glyph::Op(op) => Token::Opcode(op),
            Glyph::LabelDef => Token::LabelDef,
        };

        if glyph.arity() != Arity::None {
            self.pending = Some(self.lex_operand(glyph, span));
        }

        Some(Ok(Spanned::new(token, span)))
    }

    fn lex_word(&mut self, start: Span) -> (&'a str, Span) {
        let begin = start.start;

        while let Some((_, g)) = self.graphemes.peek() {
            if !is_word_char(g) {
                break;
            }
            self.advance();
        }

        let end = self.pos();

        (&self.input[begin..end], Span { end, ..start })
    }

    fn lex_operand(&mut self, glyph: Glyph, glyph_span: Span) -> LexResult {
        self.skip_ignored_input();

        let start = self.here();
        let starts_word = matches!(self.graphemes.peek(), Some((_, g)) if is_word_char(g));

        if !starts_word {
            let expected = match glyph.arity() {
                Arity::Integer => "a number",
                Arity::Target => "a label or an instruction index",
                _ => "a label name",
            };

            return Err(Spanned::new(
                LexError::MissingOperand {
                    glyph: glyph.as_str(),
                    expected,
                },
                glyph_span,
            ));
        }

        let (word, span) = self.lex_word(start);

        match glyph.arity() {
            Arity::Integer => lex_literal(word, span),
            Arity::Target if looks_numeric(word) => lex_literal(word, span),
            _ => lex_label(word, span),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.lex_token()
    }
}

/// Lexes the whole source, collecting every error instead of stopping at the first.
pub fn tokenize(source: &str) -> Result<Vec<Spanned<Token>>, Vec<Spanned<LexError>>> {
    let mut tokens = vec![];
    let mut errors = vec![];

    for result in Lexer::new(source) {
        match result {
            Ok(token) => tokens.push(token),
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}

fn stray_word(word: &str, span: Span) -> LexResult {
    if looks_numeric(word) {
        lex_literal(word, span)
    } else {
        lex_label(word, span)
    }
}

fn lex_literal(word: &str, span: Span) -> LexResult {
    match word.parse::<i64>() {
        Ok(val) => Ok(Spanned::new(Token::Literal(val), span)),
        Err(_) => Err(Spanned::new(LexError::InvalidLiteral(word.to_string()), span)),
    }
}

fn lex_label(word: &str, span: Span) -> LexResult {
    let mut chars = word.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(Spanned::new(Token::Label(word.to_string()), span))
    } else {
        Err(Spanned::new(LexError::InvalidLabel(word.to_string()), span))
    }
}

fn looks_numeric(word: &str) -> bool {
    matches!(word.chars().next(), Some(c) if c.is_ascii_digit() || c == '-' || c == '+')
}

fn is_word_char(g: &str) -> bool {
    let mut chars = g.chars();

    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '+',
        _ => false,
    }
}

fn is_whitespace(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}
