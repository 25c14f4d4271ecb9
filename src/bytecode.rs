//! The EmojiASM instruction set.
//!
//! The opcode table is closed: every glyph maps to exactly one [`Opcode`]
//! with a fixed [`Arity`]. Changing anything here changes the meaning of
//! existing lesson programs, so it must go together with a bump of
//! [`LANGUAGE_VERSION`](crate::runtime::constants::LANGUAGE_VERSION).

use std::collections::BTreeMap;
use std::fmt;

use crate::parser::Span;

/// Emoji variation selectors. They never change which opcode a glyph names.
const VARIATION_SELECTORS: [char; 2] = ['\u{FE0E}', '\u{FE0F}'];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Push,
    Print,
    Halt,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Lt,
    Gt,
    Dup,
    Swap,
    Drop,
    Jump,
    JumpIf,
}

/// What a glyph expects to follow it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    None,
    /// a signed integer literal
    Integer,
    /// a label name or an absolute instruction index
    Target,
    /// a label name
    Name,
}

/// A recognised glyph. Labels are a directive, not an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Glyph {
    Op(Opcode),
    LabelDef,
}

pub const LABEL_GLYPH: &str = "🏷️";

// Stored without variation selectors, see `Glyph::lookup`.
const GLYPH_TABLE: [(&str, Glyph); 17] = [
    ("📥", Glyph::Op(Opcode::Push)),
    ("🖨", Glyph::Op(Opcode::Print)),
    ("⏹", Glyph::Op(Opcode::Halt)),
    ("➕", Glyph::Op(Opcode::Add)),
    ("➖", Glyph::Op(Opcode::Sub)),
    ("✖", Glyph::Op(Opcode::Mul)),
    ("➗", Glyph::Op(Opcode::Div)),
    ("🧮", Glyph::Op(Opcode::Mod)),
    ("🟰", Glyph::Op(Opcode::Eq)),
    ("◀", Glyph::Op(Opcode::Lt)),
    ("▶", Glyph::Op(Opcode::Gt)),
    ("📋", Glyph::Op(Opcode::Dup)),
    ("🔀", Glyph::Op(Opcode::Swap)),
    ("🗑", Glyph::Op(Opcode::Drop)),
    ("🏷", Glyph::LabelDef),
    ("🦘", Glyph::Op(Opcode::Jump)),
    ("🤔", Glyph::Op(Opcode::JumpIf)),
];

impl Glyph {
    /// Looks up a single grapheme cluster in the opcode table.
    pub fn lookup(grapheme: &str) -> Option<Glyph> {
        let stripped: String = grapheme
            .chars()
            .filter(|c| !VARIATION_SELECTORS.contains(c))
            .collect();

        GLYPH_TABLE
            .iter()
            .find(|(glyph, _)| *glyph == stripped)
            .map(|(_, glyph)| *glyph)
    }

    pub fn arity(&self) -> Arity {
        match self {
            Glyph::Op(op) => op.arity(),
            Glyph::LabelDef => Arity::Name,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Glyph::Op(op) => op.glyph(),
            Glyph::LabelDef => LABEL_GLYPH,
        }
    }
}

impl Opcode {
    pub fn arity(&self) -> Arity {
        match self {
            Opcode::Push => Arity::Integer,
            Opcode::Jump | Opcode::JumpIf => Arity::Target,
            _ => Arity::None,
        }
    }

    /// The canonical spelling, as printed in listings and diagnostics.
    pub fn glyph(&self) -> &'static str {
        match self {
            Opcode::Push => "📥",
            Opcode::Print => "🖨️",
            Opcode::Halt => "⏹️",
            Opcode::Add => "➕",
            Opcode::Sub => "➖",
            Opcode::Mul => "✖️",
            Opcode::Div => "➗",
            Opcode::Mod => "🧮",
            Opcode::Eq => "🟰",
            Opcode::Lt => "◀️",
            Opcode::Gt => "▶️",
            Opcode::Dup => "📋",
            Opcode::Swap => "🔀",
            Opcode::Drop => "🗑️",
            Opcode::Jump => "🦘",
            Opcode::JumpIf => "🤔",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Push => "push",
            Opcode::Print => "print",
            Opcode::Halt => "halt",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Mod => "mod",
            Opcode::Eq => "eq",
            Opcode::Lt => "lt",
            Opcode::Gt => "gt",
            Opcode::Dup => "dup",
            Opcode::Swap => "swap",
            Opcode::Drop => "drop",
            Opcode::Jump => "jump",
            Opcode::JumpIf => "jump-if",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Jump targets are absolute instruction indices.
pub type Address = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    Push(i64),
    Print,
    Halt,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Lt,
    Gt,
    Dup,
    Swap,
    Drop,
    Jump(Address),
    JumpIf(Address),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Int(i64),
    Address(Address),
}

impl Instruction {
    /// Builds the instruction for an opcode that takes no operand.
    pub fn nullary(opcode: Opcode) -> Option<Self> {
        let instr = match opcode {
            Opcode::Print => Instruction::Print,
            Opcode::Halt => Instruction::Halt,
            Opcode::Add => Instruction::Add,
            Opcode::Sub => Instruction::Sub,
            Opcode::Mul => Instruction::Mul,
            Opcode::Div => Instruction::Div,
            Opcode::Mod => Instruction::Mod,
            Opcode::Eq => Instruction::Eq,
            Opcode::Lt => Instruction::Lt,
            Opcode::Gt => Instruction::Gt,
            Opcode::Dup => Instruction::Dup,
            Opcode::Swap => Instruction::Swap,
            Opcode::Drop => Instruction::Drop,
            Opcode::Push | Opcode::Jump | Opcode::JumpIf => return None,
        };

        Some(instr)
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Push(_) => Opcode::Push,
            Instruction::Print => Opcode::Print,
            Instruction::Halt => Opcode::Halt,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::Mod => Opcode::Mod,
            Instruction::Eq => Opcode::Eq,
            Instruction::Lt => Opcode::Lt,
            Instruction::Gt => Opcode::Gt,
            Instruction::Dup => Opcode::Dup,
            Instruction::Swap => Opcode::Swap,
            Instruction::Drop => Opcode::Drop,
            Instruction::Jump(_) => Opcode::Jump,
            Instruction::JumpIf(_) => Opcode::JumpIf,
        }
    }

    pub fn operand(&self) -> Option<Operand> {
        match self {
            Instruction::Push(val) => Some(Operand::Int(*val)),
            Instruction::Jump(addr) | Instruction::JumpIf(addr) => Some(Operand::Address(*addr)),
            _ => None,
        }
    }

    pub(crate) fn set_target(&mut self, target: Address) {
        if let Instruction::Jump(addr) | Instruction::JumpIf(addr) = self {
            *addr = target;
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.operand() {
            Some(Operand::Int(val)) => write!(f, "{} {}", self.opcode(), val),
            Some(Operand::Address(addr)) => write!(f, "{} @{}", self.opcode(), addr),
            None => write!(f, "{}", self.opcode()),
        }
    }
}

/// A parsed program. Never mutated once the parser hands it out.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    instrs: Vec<Instruction>,
    spans: Vec<Span>,
    labels: BTreeMap<String, Address>,
}

impl Program {
    pub(crate) fn new(
        instrs: Vec<Instruction>,
        spans: Vec<Span>,
        labels: BTreeMap<String, Address>,
    ) -> Self {
        debug_assert_eq!(instrs.len(), spans.len());

        Self {
            instrs,
            spans,
            labels,
        }
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn get(&self, addr: Address) -> Option<Instruction> {
        self.instrs.get(addr).copied()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instrs
    }

    pub fn span(&self, addr: Address) -> Option<Span> {
        self.spans.get(addr).copied()
    }

    pub fn labels(&self) -> &BTreeMap<String, Address> {
        &self.labels
    }

    pub fn label_address(&self, name: &str) -> Option<Address> {
        self.labels.get(name).copied()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut names_at: BTreeMap<Address, Vec<&str>> = BTreeMap::new();
        for (name, addr) in self.labels.iter() {
            names_at.entry(*addr).or_default().push(name);
        }

        for addr in 0..=self.instrs.len() {
            if let Some(names) = names_at.get(&addr) {
                for name in names {
                    writeln!(f, "{}:", name)?;
                }
            }

            if let Some(instr) = self.instrs.get(addr) {
                writeln!(f, "{:04}    {}", addr, instr)?;
            }
        }

        Ok(())
    }
}
