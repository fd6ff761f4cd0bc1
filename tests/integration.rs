//! End-to-end pipeline tests: source text in, printed output or an error
//! kind out, never touching intermediate representations directly.
//!
//! Scenario shape grounded on
//! `adhirajagarwala-lc3-assembler/tests/integration_tests.rs`'s
//! run-the-whole-pipeline-and-assert helpers.

use oillang::error::OilError;
use oillang::run_source;

fn output(source: &str) -> Vec<String> {
    run_source(source).unwrap_or_else(|err| panic!("expected success, got {err}"))
}

fn fails(source: &str) -> OilError {
    run_source(source).expect_err("expected an error")
}

#[test]
fn assignment_and_arithmetic() {
    assert_eq!(output("x = 5; print x + 3;"), vec!["8"]);
}

#[test]
fn while_loop_counts_up() {
    assert_eq!(
        output("x = 0; while (x < 3) { print x; x += 1; }"),
        vec!["0", "1", "2"]
    );
}

#[test]
fn if_else_branches() {
    assert_eq!(output("if (1) { print 1; } else { print 2; }"), vec!["1"]);
    assert_eq!(output("if (0) { print 1; } else { print 2; }"), vec!["2"]);
}

#[test]
fn precedence_matches_ordinary_arithmetic() {
    assert_eq!(output("print 2 + 3 * 4;"), vec!["14"]);
    assert_eq!(output("print (2 + 3) * 4;"), vec!["20"]);
}

#[test]
fn division_floors_and_not_negates_truthiness() {
    assert_eq!(output("print 7 / 2;"), vec!["3"]);
    assert_eq!(output("print !0;"), vec!["1"]);
    assert_eq!(output("print !5;"), vec!["0"]);
}

#[test]
fn compound_assign_subtracts_in_place() {
    assert_eq!(output("a = 10; b = 3; a -= b; print a;"), vec!["7"]);
}

#[test]
fn comparison_chain_groups_left_to_right_through_and() {
    assert_eq!(output("a = 1; b = 2; c = 3; d = 4; print a < b && c < d;"), vec!["1"]);
}

#[test]
fn missing_right_hand_side_of_assignment_is_a_parse_error() {
    let err = fails("x = ;");
    assert!(matches!(err, OilError::Parse { .. }));
}

#[test]
fn unexpected_character_is_a_lex_error() {
    match fails("x = 1;\n@\n") {
        OilError::Lex { message, .. } => assert!(message.contains('@')),
        other => panic!("expected Lex error, got {other:?}"),
    }
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    assert!(matches!(fails("x = 1 / 0;"), OilError::Runtime { .. }));
}

#[test]
fn while_missing_closing_brace_is_a_parse_error() {
    assert!(matches!(fails("while (1) {"), OilError::Parse { .. }));
}

#[test]
fn while_missing_closing_paren_is_a_parse_error() {
    assert!(matches!(fails("while (1 { print 1; }"), OilError::Parse { .. }));
}
