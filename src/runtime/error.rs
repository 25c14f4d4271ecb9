use std::fmt;

use thiserror::Error;

use super::constants::STACK_CAPACITY;
use crate::bytecode::{Address, Opcode};
use crate::parser::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RuntimeFaultKind {
    #[error("stack underflow, {needed} value(s) needed but the stack holds {available}")]
    StackUnderflow { needed: usize, available: usize },

    #[error("stack overflow, the stack holds at most {} values", STACK_CAPACITY)]
    StackOverflow,

    #[error("division by zero")]
    DivideByZero,

    #[error("jump target {target} is outside the program (last valid target is {len})")]
    InvalidJumpTarget { target: Address, len: usize },
}

impl RuntimeFaultKind {
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeFaultKind::StackUnderflow { .. } => "StackUnderflow",
            RuntimeFaultKind::StackOverflow => "StackOverflow",
            RuntimeFaultKind::DivideByZero => "DivideByZero",
            RuntimeFaultKind::InvalidJumpTarget { .. } => "InvalidJumpTarget",
        }
    }
}

/// A well-formed program misbehaved. Carries the faulting instruction's position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeFault {
    pub kind: RuntimeFaultKind,
    pub pc: Address,
    pub opcode: Opcode,
    pub span: Option<Span>,
}

impl RuntimeFault {
    pub fn new(kind: RuntimeFaultKind, pc: Address, opcode: Opcode, span: Option<Span>) -> Self {
        Self {
            kind,
            pc,
            opcode,
            span,
        }
    }
}

impl fmt::Display for RuntimeFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {} (instruction {}", self.kind, self.opcode, self.pc)?;

        if let Some(span) = self.span {
            write!(f, ", line {}, column {}", span.line, span.column)?;
        }

        write!(f, ")")
    }
}

impl std::error::Error for RuntimeFault {}
