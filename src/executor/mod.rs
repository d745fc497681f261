//! Runs the test model and checks outcomes against expectations.

use crate::{
    model::{
        ExpectedResult, GroupResult, MethodResult, Test, TestCase, TestCaseResult, TestGroup,
        TestResult,
    },
    runtime::{builtins, Callable},
};

pub mod compare;
pub use compare::{equivalent, exactly_equal, ComparisonError, MAX_DEPTH};


/// Invokes a target once for the given case.
fn invoke(target: &Callable, case: &TestCase) -> MethodResult {
    let instance = match case.activator.as_ref().map(|activator| activator.evaluate()) {
        Some(Ok(instance)) => Some(instance),
        Some(Err(fault)) => return MethodResult::ThrownFault(fault),
        None => None,
    };

    match target.invoke(instance.as_ref(), &case.arguments) {
        Ok(Some(value)) => MethodResult::ReturnValue(value),
        Ok(None) => MethodResult::ThrownFault(builtins::null_return()),
        Err(fault) => MethodResult::ThrownFault(fault),
    }
}

impl Test {
    /// Runs every case in order. Cases are independent of each other.
    pub fn run(&self) -> TestResult {
        let case_results = self
            .cases
            .iter()
            .map(|case| TestCaseResult {
                arguments: case.arguments.clone(),
                expected: case.expected.clone(),
                method_result: invoke(&self.target, case),
            })
            .collect();

        TestResult {
            target: self.target.clone(),
            case_results,
        }
    }
}

impl TestGroup {
    pub fn run(&self) -> GroupResult {
        GroupResult {
            name: self.name.clone(),
            test_results: self.tests.iter().map(Test::run).collect(),
        }
    }
}

impl ExpectedResult {
    /// Whether an outcome satisfies this expectation. Comparison errors count
    /// as a mismatch.
    pub fn test(&self, actual: &MethodResult) -> bool {
        let compared = match (self, actual) {
            (ExpectedResult::Equality(expected), MethodResult::ReturnValue(value)) => {
                exactly_equal(expected, value)
            }
            (ExpectedResult::Equivalence(expected), MethodResult::ReturnValue(value)) => {
                equivalent(expected, value)
            }
            (ExpectedResult::TypeMatch(ty), MethodResult::ReturnValue(value)) => {
                Ok(value.type_ref() == *ty)
            }
            (ExpectedResult::FaultEquality(expected), MethodResult::ThrownFault(fault)) => {
                exactly_equal(expected, fault.value())
            }
            (ExpectedResult::FaultEquivalence(expected), MethodResult::ThrownFault(fault)) => {
                equivalent(expected, fault.value())
            }
            (ExpectedResult::FaultTypeMatch(ty), MethodResult::ThrownFault(fault)) => {
                Ok(fault.ty() == *ty)
            }
            _ => Ok(false),
        };

        compared.unwrap_or(false)
    }
}
