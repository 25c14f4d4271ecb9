mod budget;
pub mod constants;
mod error;
mod op;
mod sandbox;
mod stack;
mod trace;
mod vm;

#[cfg(test)]
mod tests;

pub use budget::{BudgetExceeded, ExecutionBudget};
pub use error::{RuntimeFault, RuntimeFaultKind};
pub use sandbox::{run_bounded, Meter, Sandbox};
pub use trace::{ExecutionTrace, TerminalStatus};
pub use vm::{execute, VM};
