use std::fmt;

use crate::bytecode::{Opcode, LABEL_GLYPH};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Opcode(Opcode),
    /// the 🏷️ directive, always followed by a `Label`
    LabelDef,
    Literal(i64),
    Label(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Opcode(op) => write!(f, "Opcode({} {})", op, op.name()),
            Token::LabelDef => write!(f, "LabelDef({})", LABEL_GLYPH),
            Token::Literal(val) => write!(f, "Literal({})", val),
            Token::Label(name) => write!(f, "Label({})", name),
        }
    }
}
