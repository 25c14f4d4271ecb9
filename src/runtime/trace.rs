use std::fmt;

use super::budget::BudgetExceeded;
use super::error::RuntimeFault;

/// How a run ended. Set exactly once per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TerminalStatus {
    Halted,
    Faulted(RuntimeFault),
    BudgetExceeded(BudgetExceeded),
}

impl TerminalStatus {
    pub fn is_halted(&self) -> bool {
        matches!(self, TerminalStatus::Halted)
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TerminalStatus::Halted => write!(f, "halted"),
            TerminalStatus::Faulted(fault) => write!(f, "runtime error: {}", fault),
            TerminalStatus::BudgetExceeded(breach) => write!(f, "stopped: {}", breach),
        }
    }
}

/// The observable result of one run: everything printed, and why it stopped.
///
/// A run cut short by a fault or the sandbox still keeps the output produced
/// up to that point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionTrace {
    pub output: Vec<String>,
    pub status: TerminalStatus,
    pub instructions_executed: u64,
}

impl ExecutionTrace {
    /// Printed values, one per line.
    pub fn output_text(&self) -> String {
        self.output.join("\n")
    }
}
