use super::test_utils::*;
use crate::{error::RunError, runner::RunOptions};

fn rule(text: &str) -> String {
    "-".repeat(text.len())
}

fn group_banner(name: &str) -> Vec<String> {
    let title = format!("---> Test Group {name} <---");
    vec![rule(&title), title.clone(), rule(&title), String::new()]
}

fn all_passing_banner() -> Vec<String> {
    vec![
        "---------------------------".to_string(),
        "---> All Tests Passing <---".to_string(),
        "---------------------------".to_string(),
    ]
}

#[test]
fn test_passing_report() {
    let code = r#"
        using "samples"; using namespace Samples;
        test_group Arithmetic;
        do Calculator -> Add: case(2, 3) expect 5;
    "#;

    let (summary, lines) = report_lines(code);

    let mut expected = vec![String::new()];
    expected.extend(group_banner("Arithmetic"));
    expected.push("Test Calculator->Add(int, int) Passing".to_string());
    expected.push("Test Group Arithmetic Passing".to_string());
    expected.push(String::new());
    expected.extend(all_passing_banner());

    assert_eq!(lines, expected);
    assert!(summary.all_passing());
    assert_eq!((summary.groups, summary.tests, summary.cases), (1, 1, 1));
}

#[test]
fn test_failing_report() {
    let code = r#"
        using "samples"; using namespace Samples;
        test_group Arithmetic;
        do Calculator -> Add: case(2, 3) expect 5, case(2, 2) expect 5;
        do Calculator -> Divide: case(1, 0) throws DivideByZeroFault;
        test_group Other;
        do Calculator -> Subtract: case(2, 1) expect 1;
    "#;

    let (summary, lines) = report_lines(code);

    let mut expected = vec![String::new()];
    expected.extend(group_banner("Arithmetic"));
    expected.extend(
        [
            "One or more tests in Test Calculator->Add(int, int) Failing",
            "Calculator->Add(<int>(2), <int>(2)) failed, expected exactly <int>(5) returned, got <int>(4) returned",
            "Test Calculator->Divide(int, int) Passing",
            "One or More tests in Test Group Arithmetic Failing",
            "",
        ]
        .map(String::from),
    );
    // each group reports its own status
    expected.extend(group_banner("Other"));
    expected.extend(
        [
            "Test Calculator->Subtract(int, int) Passing",
            "Test Group Other Passing",
            "",
            "1 of 4 test cases failing",
        ]
        .map(String::from),
    );

    assert_eq!(lines, expected);
    assert!(!summary.all_passing());
    assert_eq!(
        (summary.groups, summary.tests, summary.cases, summary.failed_cases),
        (2, 3, 4, 1)
    );
}

#[test]
fn test_empty_groups_are_skipped() {
    let code = r#"
        test_group Empty;
        test_group Maths;
        do Math -> Abs: case(-3) expect 3;
    "#;

    let (summary, lines) = report_lines(code);

    assert!(!lines.iter().any(|line| line.contains("Empty")));
    assert!(lines.contains(&"---> Test Group Maths <---".to_string()));
    assert_eq!(summary.groups, 1);
}

#[test]
fn test_default_group_is_reported_first() {
    let code = r#"
        do Math -> Max: case(1, 2) expect 2;
        test_group Named;
        do Math -> Min: case(1, 2) expect 1;
    "#;

    let (_summary, lines) = report_lines(code);
    let titles: Vec<&String> = lines
        .iter()
        .filter(|line| line.starts_with("---> Test Group"))
        .collect();

    assert_eq!(titles, vec!["---> Test Group  <---", "---> Test Group Named <---"]);
}

#[test]
fn test_print_tokens() {
    let code = "do Math -> Abs: case(-3) expect 3;";
    let (result, stdout, _stderr) = run_tdl_code_with(code, RunOptions { print_tokens: true });

    assert!(result.is_ok());
    assert_eq!(
        stdout[..12],
        [
            "KEYWORD do",
            "IDENTIFIER Math",
            "SYMBOL ->",
            "IDENTIFIER Abs",
            "SYMBOL :",
            "KEYWORD case",
            "SYMBOL (",
            "LITERAL<int> -3",
            "SYMBOL )",
            "KEYWORD expect",
            "LITERAL<int> 3",
            "SYMBOL ;",
        ]
    );
    assert_eq!(stdout[12], "");
}

#[test]
fn test_lex_error_stops_the_run() {
    let err = assert_tdl_error("do Math -> Abs: case(5.0i) expect 5;");

    assert!(matches!(err, RunError::Lex(_)));
    assert_eq!(
        err.to_string(),
        "Lexer Error: Integer literal cannot have decimal point (line 1 column 25)"
    );
}

#[test]
fn test_parse_error_stops_the_run() {
    let err = assert_tdl_error("test_group A;\ntest_group A;");

    assert!(matches!(err, RunError::Parse(_)));
    assert_eq!(
        err.to_string(),
        "Parser Error: Cannot redefine already existing test group 'A' (line 2, column 12)"
    );
}

#[test]
fn test_token_dump_happens_before_parse_errors() {
    let (result, stdout, _stderr) =
        run_tdl_code_with("do Nowhere -> X: case() expect 1;", RunOptions { print_tokens: true });

    assert!(matches!(result, Err(RunError::Parse(_))));
    assert_eq!(stdout.first().map(String::as_str), Some("KEYWORD do"));
    assert_eq!(stdout.len(), 11);
}
