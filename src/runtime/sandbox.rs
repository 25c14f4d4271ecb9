use std::time::{Duration, Instant};

use tracing::{debug, trace, trace_span};

use super::budget::{BudgetExceeded, ExecutionBudget};
use super::trace::{ExecutionTrace, TerminalStatus};
use super::vm::VM;
use crate::bytecode::Program;

/// Cooperative limiter for one run.
///
/// The VM calls `charge` before executing every instruction. The wall clock
/// starts on the first charge, i.e. at the first instruction fetch.
#[derive(Debug)]
pub struct Meter {
    max_instructions: u64,
    time_limit: Duration,
    executed: u64,
    started: Option<Instant>,
}

impl Meter {
    pub fn new(budget: &ExecutionBudget) -> Self {
        Self {
            max_instructions: budget.max_instructions,
            time_limit: budget.time_limit,
            executed: 0,
            started: None,
        }
    }

    pub fn charge(&mut self) -> Result<(), BudgetExceeded> {
        if self.executed >= self.max_instructions {
            return Err(BudgetExceeded::InstructionLimit {
                limit: self.max_instructions,
            });
        }

        let now = Instant::now();
        let started = *self.started.get_or_insert(now);

        if now.saturating_duration_since(started) >= self.time_limit {
            return Err(BudgetExceeded::TimeLimit {
                limit: self.time_limit,
            });
        }

        self.executed += 1;

        Ok(())
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    pub fn elapsed(&self) -> Duration {
        self.started
            .map(|started| started.elapsed())
            .unwrap_or_default()
    }
}

/// Runs programs under one fixed budget. Holds no per-run state, so a single
/// sandbox can be shared by concurrent validations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sandbox {
    budget: ExecutionBudget,
}

impl Sandbox {
    pub fn new(budget: ExecutionBudget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> &ExecutionBudget {
        &self.budget
    }

    pub fn run(&self, program: &Program) -> ExecutionTrace {
        run_bounded(program, &self.budget)
    }
}

/// Executes `program` without ever exceeding `budget`, whatever the program does.
pub fn run_bounded(program: &Program, budget: &ExecutionBudget) -> ExecutionTrace {
    let span = trace_span!("run_bounded", instructions = program.len());
    let _guard = span.enter();

    let mut meter = Meter::new(budget);
    let trace = VM::new(program, budget).run(&mut meter);

    match &trace.status {
        TerminalStatus::BudgetExceeded(breach) => debug!(
            limit = breach.name(),
            executed = meter.executed(),
            elapsed_us = meter.elapsed().as_micros() as u64,
            output_lines = trace.output.len(),
            "budget exceeded"
        ),
        status => trace!(
            %status,
            executed = meter.executed(),
            elapsed_us = meter.elapsed().as_micros() as u64,
            "run finished"
        ),
    }

    trace
}
