//! Decides whether a run satisfies a lesson step.
//!
//! Validation is a pure comparison over an [`ExecutionTrace`]: it never
//! re-executes anything. A run that faulted or was stopped by the sandbox
//! always fails, and the reason keeps its kind so the caller can tell a
//! timeout apart from a wrong answer.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::parser::SyntaxError;
use crate::runtime::{BudgetExceeded, ExecutionTrace, RuntimeFault, TerminalStatus};

type CheckFn = dyn Fn(&ExecutionTrace) -> Result<(), String> + Send + Sync;

/// A lesson-authored predicate over a trace.
#[derive(Clone)]
pub enum StepExpectation {
    /// printed lines joined by `\n` must equal the text, ignoring trailing whitespace
    ExactOutput(String),
    /// printed lines joined by `\n` must contain the text
    OutputContains(String),
    /// printed lines must match one to one
    OutputLines(Vec<String>),
    Custom(Arc<CheckFn>),
}

impl StepExpectation {
    pub fn exact(text: impl Into<String>) -> Self {
        StepExpectation::ExactOutput(text.into())
    }

    pub fn contains(text: impl Into<String>) -> Self {
        StepExpectation::OutputContains(text.into())
    }

    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StepExpectation::OutputLines(lines.into_iter().map(Into::into).collect())
    }

    pub fn custom(
        check: impl Fn(&ExecutionTrace) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        StepExpectation::Custom(Arc::new(check))
    }

    fn check(&self, trace: &ExecutionTrace) -> Result<(), FailureReason> {
        let observed = trace.output_text();

        match self {
            StepExpectation::ExactOutput(expected) => {
                if observed.trim_end() == expected.trim_end() {
                    Ok(())
                } else {
                    Err(FailureReason::Mismatch {
                        expected: expected.clone(),
                        observed,
                    })
                }
            }
            StepExpectation::OutputContains(needle) => {
                if observed.contains(needle.as_str()) {
                    Ok(())
                } else {
                    Err(FailureReason::Mismatch {
                        expected: format!("output containing `{}`", needle),
                        observed,
                    })
                }
            }
            StepExpectation::OutputLines(lines) => {
                if trace.output == *lines {
                    Ok(())
                } else {
                    Err(FailureReason::Mismatch {
                        expected: lines.join("\n"),
                        observed,
                    })
                }
            }
            StepExpectation::Custom(check) => check(trace).map_err(FailureReason::Rejected),
        }
    }
}

impl fmt::Debug for StepExpectation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StepExpectation::ExactOutput(text) => f.debug_tuple("ExactOutput").field(text).finish(),
            StepExpectation::OutputContains(text) => {
                f.debug_tuple("OutputContains").field(text).finish()
            }
            StepExpectation::OutputLines(lines) => {
                f.debug_tuple("OutputLines").field(lines).finish()
            }
            StepExpectation::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Coarse failure category, for callers that only need to pick a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    Syntax,
    Runtime,
    Budget,
    Mismatch,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("your program has a syntax error: {0}")]
    Syntax(SyntaxError),

    #[error("your program crashed: {0}")]
    Fault(RuntimeFault),

    #[error("{0}")]
    BudgetExceeded(BudgetExceeded),

    #[error("expected {expected:?} but your program printed {observed:?}")]
    Mismatch { expected: String, observed: String },

    #[error("{0}")]
    Rejected(String),
}

impl FailureReason {
    pub fn class(&self) -> FailureClass {
        match self {
            FailureReason::Syntax(_) => FailureClass::Syntax,
            FailureReason::Fault(_) => FailureClass::Runtime,
            FailureReason::BudgetExceeded(_) => FailureClass::Budget,
            FailureReason::Mismatch { .. } | FailureReason::Rejected(_) => FailureClass::Mismatch,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    pub passed: bool,
    pub observed_output: Vec<String>,
    pub failure_reason: Option<FailureReason>,
}

impl ValidationResult {
    pub fn pass(observed_output: Vec<String>) -> Self {
        Self {
            passed: true,
            observed_output,
            failure_reason: None,
        }
    }

    pub fn fail(observed_output: Vec<String>, reason: FailureReason) -> Self {
        Self {
            passed: false,
            observed_output,
            failure_reason: Some(reason),
        }
    }

    pub fn observed_text(&self) -> String {
        self.observed_output.join("\n")
    }
}

pub fn validate(trace: &ExecutionTrace, expectation: &StepExpectation) -> ValidationResult {
    let observed = trace.output.clone();

    let reason = match &trace.status {
        TerminalStatus::Faulted(fault) => FailureReason::Fault(*fault),
        TerminalStatus::BudgetExceeded(breach) => FailureReason::BudgetExceeded(*breach),
        TerminalStatus::Halted => match expectation.check(trace) {
            Ok(()) => return ValidationResult::pass(observed),
            Err(reason) => reason,
        },
    };

    ValidationResult::fail(observed, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Opcode;
    use crate::runtime::RuntimeFaultKind;

    fn halted(lines: &[&str]) -> ExecutionTrace {
        ExecutionTrace {
            output: lines.iter().map(|l| l.to_string()).collect(),
            status: TerminalStatus::Halted,
            instructions_executed: 3,
        }
    }

    #[test]
    fn exact_match_passes() {
        let result = validate(&halted(&["42"]), &StepExpectation::exact("42"));

        assert!(result.passed);
        assert_eq!(result.observed_output, vec!["42".to_string()]);
        assert_eq!(result.failure_reason, None);
    }

    #[test]
    fn exact_match_ignores_trailing_whitespace() {
        let result = validate(&halted(&["1", "2"]), &StepExpectation::exact("1\n2\n"));

        assert!(result.passed);
    }

    #[test]
    fn wrong_output_is_a_mismatch() {
        let result = validate(&halted(&["41"]), &StepExpectation::exact("42"));

        assert!(!result.passed);
        assert_eq!(
            result.failure_reason,
            Some(FailureReason::Mismatch {
                expected: "42".to_string(),
                observed: "41".to_string(),
            })
        );
    }

    #[test]
    fn contains() {
        let trace = halted(&["1", "2", "3"]);

        assert!(validate(&trace, &StepExpectation::contains("2\n3")).passed);
        assert!(!validate(&trace, &StepExpectation::contains("4")).passed);
    }

    #[test]
    fn lines_must_match_exactly() {
        let trace = halted(&["1", "2"]);

        assert!(validate(&trace, &StepExpectation::lines(["1", "2"])).passed);
        assert!(!validate(&trace, &StepExpectation::lines(["1", "2", ""])).passed);
    }

    #[test]
    fn custom_checker() {
        let even = StepExpectation::custom(|trace| {
            if trace.output.len() % 2 == 0 {
                Ok(())
            } else {
                Err("print an even number of lines".to_string())
            }
        });

        assert!(validate(&halted(&["a", "b"]), &even).passed);

        let result = validate(&halted(&["a"]), &even);
        assert_eq!(
            result.failure_reason,
            Some(FailureReason::Rejected(
                "print an even number of lines".to_string()
            ))
        );
        assert_eq!(
            result.failure_reason.map(|r| r.class()),
            Some(FailureClass::Mismatch)
        );
    }

    #[test]
    fn fault_fails_even_when_output_matches() {
        let fault = RuntimeFault::new(
            RuntimeFaultKind::StackUnderflow {
                needed: 1,
                available: 0,
            },
            1,
            Opcode::Print,
            None,
        );
        let trace = ExecutionTrace {
            output: vec!["42".to_string()],
            status: TerminalStatus::Faulted(fault),
            instructions_executed: 2,
        };
        let result = validate(&trace, &StepExpectation::exact("42"));

        assert!(!result.passed);
        assert_eq!(result.failure_reason, Some(FailureReason::Fault(fault)));
        assert_eq!(result.observed_output, vec!["42".to_string()]);
    }

    #[test]
    fn budget_breach_is_not_a_mismatch() {
        let breach = BudgetExceeded::InstructionLimit { limit: 10 };
        let trace = ExecutionTrace {
            output: vec![],
            status: TerminalStatus::BudgetExceeded(breach),
            instructions_executed: 10,
        };
        let result = validate(&trace, &StepExpectation::contains(""));
        let reason = result.failure_reason.unwrap();

        assert_eq!(reason, FailureReason::BudgetExceeded(breach));
        assert_eq!(reason.class(), FailureClass::Budget);
        assert_eq!(reason.to_string(), "your program ran more than 10 instructions");
    }

    #[test]
    fn validate_does_not_touch_the_trace() {
        let trace = halted(&["42"]);
        let before = trace.clone();

        validate(&trace, &StepExpectation::exact("nope"));

        assert_eq!(trace, before);
    }
}
