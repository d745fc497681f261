//! The executable test model produced by the parser.

use std::fmt;

use crate::runtime::{Callable, Constructor, Fault, TypeRef, Value};

#[derive(Debug)]
pub struct TestGroup {
    pub name: String,
    pub tests: Vec<Test>,
}

impl TestGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tests: vec![],
        }
    }
}

/// A resolved target together with the cases run against it.
#[derive(Debug)]
pub struct Test {
    pub target: Callable,
    pub cases: Vec<TestCase>,
}

#[derive(Debug)]
pub struct TestCase {
    /// Produces the dispatch instance. `None` for static targets.
    pub activator: Option<ValueExpr>,
    pub arguments: Vec<Value>,
    pub expected: ExpectedResult,
}

/// A value evaluated at run time.
#[derive(Debug, Clone)]
pub enum ValueExpr {
    Literal(Value),
    /// Constructed afresh on every evaluation.
    New {
        constructor: Constructor,
        args: Vec<Value>,
    },
}

impl ValueExpr {
    pub fn evaluate(&self) -> Result<Value, Fault> {
        match self {
            ValueExpr::Literal(value) => Ok(value.clone()),
            ValueExpr::New { constructor, args } => constructor.construct(args),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExpectedResult {
    Equality(Value),
    Equivalence(Value),
    TypeMatch(TypeRef),
    FaultEquality(Value),
    FaultEquivalence(Value),
    FaultTypeMatch(TypeRef),
}

impl fmt::Display for ExpectedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedResult::Equality(value) => {
                write!(f, "exactly {} returned", value.to_typed_string())
            }
            ExpectedResult::Equivalence(value) => {
                write!(f, "equivalent of {} returned", value.to_typed_string())
            }
            ExpectedResult::TypeMatch(ty) => write!(f, "object of type {ty} returned"),
            ExpectedResult::FaultEquality(value) => {
                write!(f, "exactly {} thrown", value.to_typed_string())
            }
            ExpectedResult::FaultEquivalence(value) => {
                write!(f, "equivalent to {} thrown", value.to_typed_string())
            }
            ExpectedResult::FaultTypeMatch(ty) => write!(f, "exception of type {ty} thrown"),
        }
    }
}

/// What a single invocation produced.
#[derive(Debug, Clone)]
pub enum MethodResult {
    ReturnValue(Value),
    ThrownFault(Fault),
}

impl fmt::Display for MethodResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodResult::ReturnValue(value) => write!(f, "{} returned", value.to_typed_string()),
            MethodResult::ThrownFault(fault) => write!(f, "{} thrown", fault.ty().short_name()),
        }
    }
}

#[derive(Debug)]
pub struct TestCaseResult {
    pub arguments: Vec<Value>,
    pub expected: ExpectedResult,
    pub method_result: MethodResult,
}

impl TestCaseResult {
    pub fn is_successful(&self) -> bool {
        self.expected.test(&self.method_result)
    }
}

#[derive(Debug)]
pub struct TestResult {
    pub target: Callable,
    pub case_results: Vec<TestCaseResult>,
}

impl TestResult {
    pub fn is_successful(&self) -> bool {
        self.case_results.iter().all(TestCaseResult::is_successful)
    }

    pub fn failed_cases(&self) -> impl Iterator<Item = &TestCaseResult> {
        self.case_results.iter().filter(|case| !case.is_successful())
    }
}

#[derive(Debug)]
pub struct GroupResult {
    pub name: String,
    pub test_results: Vec<TestResult>,
}

impl GroupResult {
    pub fn is_successful(&self) -> bool {
        self.test_results.iter().all(TestResult::is_successful)
    }
}
