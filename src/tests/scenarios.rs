use super::test_utils::*;

const CALCULATOR: &str = include_str!("../../demos/calculator.tdl");
const OBJECTS: &str = include_str!("../../demos/objects.tdl");
const STRINGS: &str = include_str!("../../demos/strings.tdl");
const FAILING: &str = include_str!("../../demos/failing.tdl");

fn assert_all_passing(code: &str) {
    let (summary, lines) = report_lines(code);
    assert!(
        summary.all_passing(),
        "expected every case to pass:\n{}",
        lines.join("\n")
    );
    assert_eq!(
        lines.last().map(String::as_str),
        Some("---------------------------")
    );
}

#[test]
fn test_calculator_demo() {
    assert_all_passing(CALCULATOR);

    let (summary, _lines) = report_lines(CALCULATOR);
    assert_eq!((summary.groups, summary.tests, summary.cases), (2, 4, 10));
}

#[test]
fn test_objects_demo() {
    assert_all_passing(OBJECTS);
}

#[test]
fn test_strings_demo() {
    assert_all_passing(STRINGS);
}

#[test]
fn test_failing_demo() {
    let (summary, lines) = report_lines(FAILING);

    assert_eq!(summary.failed_cases, 2);
    assert!(lines.contains(
        &"Calculator->Multiply(<int>(6), <int>(7)) failed, expected exactly <int>(43) returned, got <int>(42) returned"
            .to_string()
    ));
    assert!(lines.contains(
        &"Greeter->Greet(<string>(Ada)) failed, expected exception of type ArgumentFault thrown, got <string>(Hello, Ada!) returned"
            .to_string()
    ));
    assert_eq!(lines.last().map(String::as_str), Some("2 of 2 test cases failing"));
}

#[test]
fn test_crlf_sources_behave_like_lf() {
    let crlf = CALCULATOR.replace('\n', "\r\n");
    let (lf_summary, lf_lines) = report_lines(CALCULATOR);
    let (crlf_summary, crlf_lines) = report_lines(&crlf);

    assert_eq!(lf_summary, crlf_summary);
    assert_eq!(lf_lines, crlf_lines);
}

#[test]
fn test_unloaded_unit_is_reported() {
    let err = assert_tdl_error(
        r#"using "samples/missing";
        do Calculator -> Add: case(1, 1) expect 2;"#,
    );

    assert_eq!(
        err.to_string(),
        "Parser Error: Code unit does not exist (line 1, column 7)"
    );
}
