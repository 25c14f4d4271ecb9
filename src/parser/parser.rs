use std::collections::BTreeMap;
use std::iter::Peekable;
use std::slice::Iter;

use super::error::{ParseError, SyntaxErrorItem};
use super::spanned::{Span, Spanned};
use super::token::Token;
use crate::bytecode::{Address, Arity, Instruction, Opcode, Program};

/// Turns a token stream into a [`Program`].
///
/// One pass emits instructions and records label definitions and jump
/// references; a second step back-patches every reference. Nothing is
/// evaluated here.
pub struct Parser<'t> {
    tokens: Peekable<Iter<'t, Spanned<Token>>>,
    instrs: Vec<Instruction>,
    spans: Vec<Span>,
    labels: BTreeMap<String, (Address, Span)>,
    backpatches: Vec<(Address, Spanned<String>)>,
    errors: Vec<Spanned<SyntaxErrorItem>>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Spanned<Token>]) -> Self {
        Self {
            tokens: tokens.iter().peekable(),
            instrs: vec![],
            spans: vec![],
            labels: BTreeMap::new(),
            backpatches: vec![],
            errors: vec![],
        }
    }

    pub fn parse(mut self) -> Result<Program, Vec<Spanned<SyntaxErrorItem>>> {
        while let Some(token) = self.tokens.next() {
            match &token.item {
                Token::Opcode(op) => self.parse_instruction(*op, token.span),
                Token::LabelDef => self.parse_label_def(token.span),
                Token::Literal(val) => self.add_err(
                    ParseError::MalformedInstruction(format!(
                        "the number `{}` does not belong to any instruction",
                        val
                    )),
                    token.span,
                ),
                Token::Label(name) => self.add_err(
                    ParseError::MalformedInstruction(format!(
                        "the label `{}` does not belong to any instruction",
                        name
                    )),
                    token.span,
                ),
            }
        }

        self.backpatch();

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let labels = self
            .labels
            .into_iter()
            .map(|(name, (addr, _))| (name, addr))
            .collect();

        Ok(Program::new(self.instrs, self.spans, labels))
    }

    fn parse_instruction(&mut self, op: Opcode, span: Span) {
        match op.arity() {
            Arity::Integer => match self.tokens.next_if(|t| matches!(t.item, Token::Literal(_))) {
                Some(Spanned {
                    item: Token::Literal(val),
                    ..
                }) => self.emit(Instruction::Push(*val), span),
                _ => self.add_err(
                    ParseError::MalformedInstruction(format!("{} expects a number", op)),
                    span,
                ),
            },
            Arity::Target => {
                let operand = self
                    .tokens
                    .next_if(|t| matches!(t.item, Token::Literal(_) | Token::Label(_)));

                let target = match operand.map(|t| (&t.item, t.span)) {
                    Some((Token::Literal(val), operand_span)) => match Address::try_from(*val) {
                        Ok(addr) => addr,
                        Err(_) => {
                            self.add_err(
                                ParseError::MalformedInstruction(format!(
                                    "jump target {} is negative",
                                    val
                                )),
                                operand_span,
                            );
                            return;
                        }
                    },
                    Some((Token::Label(name), operand_span)) => {
                        self.backpatches.push((
                            self.instrs.len(),
                            Spanned::new(name.clone(), operand_span),
                        ));
                        0
                    }
                    _ => {
                        self.add_err(
                            ParseError::MalformedInstruction(format!(
                                "{} expects a label or an instruction index",
                                op
                            )),
                            span,
                        );
                        return;
                    }
                };

                let instr = if op == Opcode::Jump {
                    Instruction::Jump(target)
                } else {
                    Instruction::JumpIf(target)
                };

                self.emit(instr, span);
            }
            Arity::None | Arity::Name => match Instruction::nullary(op) {
                Some(instr) => self.emit(instr, span),
                None => self.add_err(
                    ParseError::MalformedInstruction(format!("{} is missing its operand", op)),
                    span,
                ),
            },
        }
    }

    fn parse_label_def(&mut self, span: Span) {
        let Some(Spanned {
            item: Token::Label(name),
            span: name_span,
        }) = self.tokens.next_if(|t| matches!(t.item, Token::Label(_)))
        else {
            self.add_err(
                ParseError::MalformedInstruction("🏷️ expects a label name".to_string()),
                span,
            );
            return;
        };

        if let Some((_, first)) = self.labels.get(name) {
            let err = ParseError::DuplicateLabel {
                name: name.clone(),
                first_line: first.line,
            };
            self.add_err(err, *name_span);
            return;
        }

        self.labels
            .insert(name.clone(), (self.instrs.len(), *name_span));
    }

    fn backpatch(&mut self) {
        for (addr, name) in std::mem::take(&mut self.backpatches) {
            match self.labels.get(&name.item) {
                Some((target, _)) => self.instrs[addr].set_target(*target),
                None => self.add_err(ParseError::UnresolvedLabel(name.item), name.span),
            }
        }
    }

    fn emit(&mut self, instr: Instruction, span: Span) {
        self.instrs.push(instr);
        self.spans.push(span);
    }

    fn add_err(&mut self, err: ParseError, span: Span) {
        self.errors.push(Spanned::new(err.into(), span));
    }
}

pub fn parse(tokens: &[Spanned<Token>]) -> Result<Program, Vec<Spanned<SyntaxErrorItem>>> {
    Parser::new(tokens).parse()
}
