use chrono::{DateTime, Utc};

use crate::{
    log_stdout,
    model::{GroupResult, TestCaseResult, TestResult},
};

/// Totals over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub groups: usize,
    pub tests: usize,
    pub cases: usize,
    pub failed_cases: usize,
}

impl RunSummary {
    pub fn all_passing(&self) -> bool {
        self.failed_cases == 0
    }

    fn add(&mut self, group: &GroupResult) {
        self.groups += 1;
        for test in &group.test_results {
            self.tests += 1;
            self.cases += test.case_results.len();
            self.failed_cases += test.failed_cases().count();
        }
    }
}

fn banner(text: &str) {
    let rule = "-".repeat(text.chars().count());
    log_stdout!("{rule}");
    log_stdout!("{text}");
    log_stdout!("{rule}");
}

fn case_line(test: &TestResult, case: &TestCaseResult) -> String {
    let arguments: Vec<String> = case.arguments.iter().map(|arg| arg.to_typed_string()).collect();
    format!(
        "{}->{}({}) failed, expected {}, got {}",
        test.target.owner.short_name(),
        test.target.name(),
        arguments.join(", "),
        case.expected,
        case.method_result
    )
}

fn report_test(test: &TestResult) {
    if test.is_successful() {
        log_stdout!("Test {} Passing", test.target);
        return;
    }

    log_stdout!("One or more tests in Test {} Failing", test.target);
    for case in test.failed_cases() {
        log_stdout!("{}", case_line(test, case));
    }
}

fn report_group(group: &GroupResult) {
    banner(&format!("---> Test Group {} <---", group.name));
    log_stdout!("");

    for test in &group.test_results {
        report_test(test);
    }

    if group.is_successful() {
        log_stdout!("Test Group {} Passing", group.name);
    } else {
        log_stdout!("One or More tests in Test Group {} Failing", group.name);
    }
    log_stdout!("");
}

/// Prints every non-empty group, then the overall verdict.
pub fn report(results: &[GroupResult], finished_at: DateTime<Utc>) -> RunSummary {
    let mut summary = RunSummary::default();
    log_stdout!("");

    for group in results.iter().filter(|group| !group.test_results.is_empty()) {
        report_group(group);
        summary.add(group);
    }

    if summary.all_passing() {
        banner("---> All Tests Passing <---");
    } else {
        log_stdout!(
            "{} of {} test cases failing",
            summary.failed_cases,
            summary.cases
        );
    }
    log_stdout!("Completed at {}", finished_at.format("%Y-%m-%d %H:%M:%S UTC"));

    summary
}
