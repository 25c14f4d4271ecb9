use pretty_assertions::assert_eq;

use super::*;
use crate::bytecode::Instruction;

fn parse_ok(source: &str) -> Program {
    match parse_program(source) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse:\n{}", err.render(source)),
    }
}

fn parse_errs(source: &str) -> Vec<SyntaxErrorItem> {
    parse_program(source)
        .unwrap_err()
        .errors()
        .iter()
        .map(|e| e.item.clone())
        .collect()
}

#[test]
fn push_print_halt() {
    let program = parse_ok("📥 42\n🖨️\n⏹️");

    assert_eq!(
        program.instructions(),
        &[Instruction::Push(42), Instruction::Print, Instruction::Halt]
    );
}

#[test]
fn forward_and_backward_labels_resolve() {
    let source = "\
🏷️ top
📥 1
🤔 done
🦘 top
🏷️ done
⏹️
";
    let program = parse_ok(source);

    assert_eq!(
        program.instructions(),
        &[
            Instruction::Push(1),
            Instruction::JumpIf(3),
            Instruction::Jump(0),
            Instruction::Halt,
        ]
    );
    assert_eq!(program.label_address("top"), Some(0));
    assert_eq!(program.label_address("done"), Some(3));
}

#[test]
fn label_after_last_instruction_points_past_the_end() {
    let program = parse_ok("🦘 end\n📥 1\n🖨️\n🏷️ end");

    assert_eq!(program.instructions()[0], Instruction::Jump(3));
    assert_eq!(program.len(), 3);
}

#[test]
fn numeric_jump_targets_are_kept_verbatim() {
    let program = parse_ok("🦘 99");

    assert_eq!(program.instructions(), &[Instruction::Jump(99)]);
}

#[test]
fn negative_jump_target_is_malformed() {
    assert!(matches!(
        parse_errs("🦘 -1").as_slice(),
        [SyntaxErrorItem::Parse(ParseError::MalformedInstruction(_))]
    ));
}

#[test]
fn unresolved_label() {
    assert_eq!(
        parse_errs("🦘 nowhere"),
        vec![SyntaxErrorItem::Parse(ParseError::UnresolvedLabel(
            "nowhere".to_string()
        ))]
    );
}

#[test]
fn duplicate_label() {
    assert_eq!(
        parse_errs("🏷️ a\n📥 1\n🏷️ a"),
        vec![SyntaxErrorItem::Parse(ParseError::DuplicateLabel {
            name: "a".to_string(),
            first_line: 1,
        })]
    );
}

#[test]
fn stray_literal_is_malformed() {
    assert!(matches!(
        parse_errs("🖨️ 42").as_slice(),
        [SyntaxErrorItem::Parse(ParseError::MalformedInstruction(_))]
    ));
}

#[test]
fn all_parse_errors_are_reported_in_source_order() {
    let errs = parse_program("🦘 a\n7\n🦘 b").unwrap_err();
    let lines: Vec<usize> = errs.errors().iter().map(|e| e.span.line).collect();

    assert_eq!(lines, vec![1, 2, 3]);
}

#[test]
fn lex_errors_stop_before_parsing() {
    let errs = parse_program("🦘 nowhere\n🍕").unwrap_err();

    assert!(errs.is_lex_error());
    assert_eq!(errs.errors().len(), 1);
}

#[test]
fn parsing_is_deterministic() {
    let source = "🏷️ l\n📥 3\n📋\n🖨️\n📥 1\n➖\n📋\n🤔 l\n⏹️";
    let tokens = tokenize(source).unwrap();

    assert_eq!(parse(&tokens).unwrap(), parse(&tokens).unwrap());
}

#[test]
fn empty_source_is_an_empty_program() {
    assert!(parse_ok("  ; nothing here\n").is_empty());
}

#[test]
fn render_marks_the_offending_glyph() {
    let source = "📥 1\n🍕 🖨️";
    let rendered = parse_program(source).unwrap_err().render(source);

    assert_eq!(
        rendered,
        "SYNTAX ERROR: line 2, column 1\n🍕 🖨️\n^^\nunknown glyph `🍕`\n"
    );
}

#[test]
fn program_listing() {
    let program = parse_ok("🏷️ top\n📥 -2\n🦘 top");

    assert_eq!(program.to_string(), "top:\n0000    📥 -2\n0001    🦘 @0\n");
}
