use std::time::Duration;

use thiserror::Error;

use super::constants::{
    DEFAULT_MAX_INSTRUCTIONS, DEFAULT_MAX_OUTPUT_BYTES, DEFAULT_MAX_STACK_DEPTH,
    DEFAULT_TIME_LIMIT,
};

/// Resource ceilings for a single run. Read-only while the program executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionBudget {
    pub max_instructions: u64,
    pub time_limit: Duration,
    pub max_stack_depth: usize,
    pub max_output_bytes: usize,
}

impl Default for ExecutionBudget {
    fn default() -> Self {
        Self {
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            time_limit: DEFAULT_TIME_LIMIT,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl ExecutionBudget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_instructions(mut self, max_instructions: u64) -> Self {
        self.max_instructions = max_instructions;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_max_stack_depth(mut self, max_stack_depth: usize) -> Self {
        self.max_stack_depth = max_stack_depth;
        self
    }

    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }
}

/// Which ceiling the sandbox enforced. Never a fault of the program's own logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BudgetExceeded {
    #[error("your program ran more than {limit} instructions")]
    InstructionLimit { limit: u64 },

    #[error("your program ran longer than {} ms", .limit.as_millis())]
    TimeLimit { limit: Duration },

    #[error("your program used more than {limit} stack slots")]
    StackLimit { limit: usize },

    #[error("your program printed more than {limit} bytes")]
    OutputLimit { limit: usize },
}

impl BudgetExceeded {
    pub fn name(&self) -> &'static str {
        match self {
            BudgetExceeded::InstructionLimit { .. } => "InstructionLimit",
            BudgetExceeded::TimeLimit { .. } => "TimeLimit",
            BudgetExceeded::StackLimit { .. } => "StackLimit",
            BudgetExceeded::OutputLimit { .. } => "OutputLimit",
        }
    }
}
