use tracing::debug;

use crate::bytecode::Program;
use crate::parser::{parse_program, SyntaxError};
use crate::runtime::{run_bounded, ExecutionBudget, ExecutionTrace};
use crate::validator::{validate, FailureReason, StepExpectation, ValidationResult};

/// The whole pipeline behind one budget.
///
/// An engine holds no per-run state. Every call builds a fresh program and VM,
/// so a single engine can be shared across threads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Engine {
    budget: ExecutionBudget,
}

impl Engine {
    pub fn new(budget: ExecutionBudget) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> &ExecutionBudget {
        &self.budget
    }

    pub fn compile(&self, source: &str) -> Result<Program, SyntaxError> {
        parse_program(source)
    }

    pub fn run(&self, program: &Program) -> ExecutionTrace {
        run_bounded(program, &self.budget)
    }

    pub fn run_source(&self, source: &str) -> Result<ExecutionTrace, SyntaxError> {
        let program = self.compile(source)?;

        Ok(self.run(&program))
    }

    /// Compiles, runs and validates a submission. Syntax errors fail the step
    /// without executing anything.
    pub fn validate_step(&self, source: &str, expectation: &StepExpectation) -> ValidationResult {
        let trace = match self.run_source(source) {
            Ok(trace) => trace,
            Err(err) => {
                debug!(errors = err.errors().len(), "submission rejected before execution");
                return ValidationResult::fail(vec![], FailureReason::Syntax(err));
            }
        };

        let result = validate(&trace, expectation);

        debug!(
            passed = result.passed,
            instructions = trace.instructions_executed,
            "step validated"
        );

        result
    }
}
