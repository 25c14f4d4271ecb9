use std::fs::File;
use std::io::Write;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use super::constants::STACK_CAPACITY;
use super::*;
use crate::bytecode::Opcode;
use crate::parser::parse_program;

fn run(source: &str, budget: ExecutionBudget) -> ExecutionTrace {
    let program = match parse_program(source) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse:\n{}", err.render(source)),
    };

    run_bounded(&program, &budget)
}

fn run_default(source: &str) -> ExecutionTrace {
    run(source, fixture_budget())
}

// Fixture runs must not depend on machine speed.
fn fixture_budget() -> ExecutionBudget {
    ExecutionBudget::default().with_time_limit(Duration::from_secs(60))
}

fn output(trace: &ExecutionTrace) -> Vec<&str> {
    trace.output.iter().map(String::as_str).collect()
}

fn fault_kind(trace: &ExecutionTrace) -> RuntimeFaultKind {
    match &trace.status {
        TerminalStatus::Faulted(fault) => fault.kind,
        other => panic!("expected a fault, got {:?}", other),
    }
}

#[test]
fn push_print_halt() {
    let trace = run_default("📥 42\n🖨️\n⏹️");

    assert_eq!(output(&trace), vec!["42"]);
    assert_eq!(trace.status, TerminalStatus::Halted);
    assert_eq!(trace.instructions_executed, 3);
}

#[test]
fn running_off_the_end_halts() {
    let trace = run_default("📥 42\n🖨️");

    assert_eq!(output(&trace), vec!["42"]);
    assert_eq!(trace.status, TerminalStatus::Halted);
}

#[test]
fn empty_program_halts_immediately() {
    let trace = run_default("");

    assert!(trace.output.is_empty());
    assert_eq!(trace.status, TerminalStatus::Halted);
    assert_eq!(trace.instructions_executed, 0);
}

#[test]
fn print_on_empty_stack_underflows() {
    let trace = run_default("🖨️");

    assert_eq!(
        fault_kind(&trace),
        RuntimeFaultKind::StackUnderflow {
            needed: 1,
            available: 0
        }
    );
    assert!(trace.output.is_empty());
}

#[test]
fn binary_op_underflow_reports_what_was_available() {
    let trace = run_default("📥 1\n➕");

    assert_eq!(
        fault_kind(&trace),
        RuntimeFaultKind::StackUnderflow {
            needed: 2,
            available: 1
        }
    );
}

#[test]
fn dup_swap_drop_underflow() {
    for source in ["📋", "📥 1 🔀", "🗑️", "🤔 0"] {
        let trace = run_default(source);

        assert!(
            matches!(fault_kind(&trace), RuntimeFaultKind::StackUnderflow { .. }),
            "{}",
            source
        );
    }
}

#[test]
fn fault_carries_position() {
    let trace = run_default("📥 1\n📥 0\n➗");

    match trace.status {
        TerminalStatus::Faulted(fault) => {
            assert_eq!(fault.kind, RuntimeFaultKind::DivideByZero);
            assert_eq!(fault.pc, 2);
            assert_eq!(fault.opcode, Opcode::Div);
            assert_eq!(fault.span.map(|s| (s.line, s.column)), Some((3, 1)));
        }
        other => panic!("expected a fault, got {:?}", other),
    }
}

#[test]
fn output_before_fault_is_kept() {
    let trace = run_default("📥 1\n🖨️\n📥 5\n📥 0\n🧮");

    assert_eq!(output(&trace), vec!["1"]);
    assert_eq!(fault_kind(&trace), RuntimeFaultKind::DivideByZero);
}

#[test]
fn arithmetic_and_comparisons() {
    let source = "\
📥 6 📥 7 ✖️ 🖨️
📥 10 📥 4 ➖ 🖨️
📥 -7 📥 2 ➗ 🖨️
📥 3 📥 3 🟰 🖨️
📥 1 📥 2 ▶️ 🖨️
📥 9223372036854775807 📥 1 ➕ 🖨️
";
    let trace = run_default(source);

    assert_eq!(
        output(&trace),
        vec!["42", "6", "-3", "1", "0", "-9223372036854775808"]
    );
}

#[test]
fn swap_and_drop() {
    let trace = run_default("📥 1 📥 2 🔀 🖨️ 🖨️ 📥 3 📥 4 🗑️ 🖨️");

    assert_eq!(output(&trace), vec!["1", "2", "3"]);
}

#[test]
fn conditional_jump_falls_through_on_zero() {
    let trace = run_default("📥 0\n🤔 skip\n📥 1\n🖨️\n🏷️ skip\n📥 2\n🖨️");

    assert_eq!(output(&trace), vec!["1", "2"]);
}

#[test]
fn conditional_jump_taken_on_any_nonzero() {
    let trace = run_default("📥 -5\n🤔 skip\n📥 1\n🖨️\n🏷️ skip\n📥 2\n🖨️");

    assert_eq!(output(&trace), vec!["2"]);
}

#[test]
fn jump_to_end_label_halts() {
    let trace = run_default("🦘 end\n📥 1\n🖨️\n🏷️ end");

    assert!(trace.output.is_empty());
    assert_eq!(trace.status, TerminalStatus::Halted);
}

#[test]
fn jump_past_the_end_is_invalid() {
    let trace = run_default("📥 1\n🦘 7");

    assert_eq!(
        fault_kind(&trace),
        RuntimeFaultKind::InvalidJumpTarget { target: 7, len: 2 }
    );
}

#[test]
fn infinite_loop_hits_instruction_limit() {
    let budget = fixture_budget().with_max_instructions(1_000);
    let trace = run("🏷️ spin\n🦘 spin", budget);

    assert_eq!(
        trace.status,
        TerminalStatus::BudgetExceeded(BudgetExceeded::InstructionLimit { limit: 1_000 })
    );
    assert_eq!(trace.instructions_executed, 1_000);
}

#[test]
fn infinite_loop_hits_time_limit() {
    let budget = ExecutionBudget::default()
        .with_max_instructions(u64::MAX)
        .with_time_limit(Duration::from_millis(20));
    let started = Instant::now();
    let trace = run("🏷️ spin\n📥 1\n🗑️\n🦘 spin", budget);

    assert_eq!(
        trace.status,
        TerminalStatus::BudgetExceeded(BudgetExceeded::TimeLimit {
            limit: Duration::from_millis(20)
        })
    );
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn limit_equal_to_program_length_completes() {
    let budget = fixture_budget().with_max_instructions(3);
    let trace = run("📥 1\n🖨️\n⏹️", budget);

    assert_eq!(trace.status, TerminalStatus::Halted);
}

#[test]
fn limit_stops_before_the_offending_print() {
    let budget = fixture_budget().with_max_instructions(3);
    let trace = run("📥 1\n🖨️\n📥 2\n🖨️", budget);

    assert_eq!(output(&trace), vec!["1"]);
    assert!(matches!(
        trace.status,
        TerminalStatus::BudgetExceeded(BudgetExceeded::InstructionLimit { .. })
    ));
}

#[test]
fn output_limit_keeps_committed_lines() {
    // "100\n" is 4 bytes, so only two prints fit in 10
    let budget = fixture_budget().with_max_output_bytes(10);
    let trace = run("🏷️ l\n📥 100\n🖨️\n🦘 l", budget);

    assert_eq!(output(&trace), vec!["100", "100"]);
    assert_eq!(
        trace.status,
        TerminalStatus::BudgetExceeded(BudgetExceeded::OutputLimit { limit: 10 })
    );
}

#[test]
fn stack_limit_from_budget() {
    let budget = fixture_budget().with_max_stack_depth(4);
    let trace = run("🏷️ l\n📥 1\n🦘 l", budget);

    assert_eq!(
        trace.status,
        TerminalStatus::BudgetExceeded(BudgetExceeded::StackLimit { limit: 4 })
    );
}

#[test]
fn zero_stack_limit_stops_the_first_push() {
    let budget = fixture_budget().with_max_stack_depth(0);
    let trace = run("📥 1\n🖨️", budget);

    assert_eq!(
        trace.status,
        TerminalStatus::BudgetExceeded(BudgetExceeded::StackLimit { limit: 0 })
    );
    assert_eq!(trace.instructions_executed, 1);
}

#[test]
fn stack_limit_equal_to_capacity_is_an_overflow() {
    let budget = fixture_budget()
        .with_max_stack_depth(STACK_CAPACITY)
        .with_max_instructions(u64::MAX);
    let trace = run("🏷️ l\n📥 1\n🦘 l", budget);

    assert_eq!(fault_kind(&trace), RuntimeFaultKind::StackOverflow);
    assert_eq!(trace.instructions_executed, 2 * STACK_CAPACITY as u64 + 1);
}

#[test]
fn stack_overflow_past_language_capacity() {
    let budget = fixture_budget()
        .with_max_stack_depth(usize::MAX)
        .with_max_instructions(u64::MAX);
    let trace = run("🏷️ l\n📥 1\n🦘 l", budget);

    assert_eq!(fault_kind(&trace), RuntimeFaultKind::StackOverflow);
    // every push succeeded up to capacity, plus one jump after each
    assert_eq!(trace.instructions_executed, 2 * STACK_CAPACITY as u64 + 1);
}

#[test]
fn execution_is_deterministic() {
    let source = "📥 5\n🏷️ l\n📋\n🖨️\n📥 1\n➖\n📋\n🤔 l";
    let program = parse_program(source).unwrap();
    let budget = fixture_budget();

    assert_eq!(
        run_bounded(&program, &budget),
        run_bounded(&program, &budget)
    );
    assert_eq!(execute(&program, &budget), run_bounded(&program, &budget));
}

#[test]
fn sandbox_shares_one_budget_across_runs() {
    let sandbox = Sandbox::new(fixture_budget().with_max_instructions(10));
    let looping = parse_program("🏷️ l\n🦘 l").unwrap();
    let hello = parse_program("📥 1\n🖨️").unwrap();

    assert!(!sandbox.run(&looping).status.is_halted());
    assert!(sandbox.run(&hello).status.is_halted());
    assert_eq!(sandbox.budget().max_instructions, 10);
}

#[test]
fn concurrent_runs_are_isolated() {
    let program = parse_program("📥 7\n🖨️").unwrap();
    let sandbox = Sandbox::new(fixture_budget());

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| sandbox.run(&program))).collect();

        for handle in handles {
            let trace = handle.join().unwrap();
            assert_eq!(output(&trace), vec!["7"]);
        }
    });
}

fn render_trace(trace: &ExecutionTrace) -> String {
    let mut out = format!(
        "status: {}\ninstructions: {}\n--- output ---\n",
        trace.status, trace.instructions_executed
    );

    for line in trace.output.iter() {
        out.push_str(line);
        out.push('\n');
    }

    out
}

fn fixture_test(test_name: &str) {
    let root = env!("CARGO_MANIFEST_DIR");
    let program_path = format!("{}/src/runtime/tests/test_programs/{}.emo", root, test_name);
    let expected_path = format!("{}/src/runtime/tests/fixtures/{}.expected", root, test_name);

    let source = std::fs::read_to_string(&program_path).unwrap();
    let actual = match parse_program(&source) {
        Ok(program) => render_trace(&run_bounded(&program, &fixture_budget())),
        Err(err) => err.render(&source),
    };

    if std::env::var("OVERWRITE_FIXTURES").is_ok() {
        let mut expected_file = File::create(&expected_path).unwrap();
        expected_file.write_all(actual.as_bytes()).unwrap();
    }

    let expected = std::fs::read_to_string(&expected_path).unwrap_or_default();

    assert_eq!(expected, actual);
}

#[test]
fn fixture_hello() {
    fixture_test("hello");
}

#[test]
fn fixture_countdown() {
    fixture_test("countdown");
}

#[test]
fn fixture_arithmetic() {
    fixture_test("arithmetic");
}

#[test]
fn fixture_divide_by_zero() {
    fixture_test("divide_by_zero");
}

#[test]
fn fixture_spin() {
    fixture_test("spin");
}

#[test]
fn fixture_syntax_error() {
    fixture_test("syntax_error");
}
