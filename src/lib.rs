pub mod bytecode;
pub mod driver;
pub mod engine;
pub mod parser;
pub mod runtime;
pub mod validator;
mod repl;

pub use bytecode::{Instruction, Opcode, Program};
pub use driver::{Config, Driver};
pub use engine::Engine;
pub use parser::{parse_program, SyntaxError};
pub use runtime::{run_bounded, ExecutionBudget, ExecutionTrace, TerminalStatus};
pub use validator::{validate, FailureReason, StepExpectation, ValidationResult};
