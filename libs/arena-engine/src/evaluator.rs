/// Test Evaluator - Language-Agnostic Scoring Logic
///
/// **Core Responsibility:**
/// Turn one adapter result into a case verdict, and fold case verdicts into
/// the submission's `JudgeReport`.
///
/// **Critical Properties:**
/// - Knows nothing about processes or workspaces
/// - Knows nothing about language runtimes
/// - Pure functions: (execution result, expected value) → verdict
///
/// **Comparison Rules:**
/// - Both values arrays: order-independent, multiplicity-sensitive
///   (`[1,0]` matches `[0,1]`, `[0,0,1]` does not match `[0,1,1]`)
/// - Anything else: exact structural equality
///
/// **Report Rules:**
/// - success iff every case passed
/// - error is the diagnostic of the first non-passing case, null on success
use arena_common::types::JudgeReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::adapter::ExecutionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseVerdict {
    Passed,
    WrongAnswer,
    CompileError,
    RuntimeError,
    TimeLimitExceeded,
    ParseError,
}

impl CaseVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseVerdict::Passed => "passed",
            CaseVerdict::WrongAnswer => "wrong_answer",
            CaseVerdict::CompileError => "compile_error",
            CaseVerdict::RuntimeError => "runtime_error",
            CaseVerdict::TimeLimitExceeded => "time_limit_exceeded",
            CaseVerdict::ParseError => "parse_error",
        }
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub index: usize,
    pub verdict: CaseVerdict,
    /// Diagnostic for every verdict except `Passed`.
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

impl CaseRecord {
    pub fn passed(&self) -> bool {
        self.verdict == CaseVerdict::Passed
    }
}

/// Compare an actual value against the expected one.
pub fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Array(expected), Value::Array(actual)) => {
            expected.len() == actual.len() && sorted(expected) == sorted(actual)
        }
        _ => expected == actual,
    }
}

fn sorted(items: &[Value]) -> Vec<String> {
    let mut keys: Vec<String> = items.iter().map(Value::to_string).collect();
    keys.sort_unstable();
    keys
}

/// Judge one case.
pub fn evaluate_case(
    index: usize,
    result: &ExecutionResult,
    expected: &Value,
    elapsed: Duration,
) -> CaseRecord {
    let (verdict, message) = match result {
        ExecutionResult::Success(actual) if values_match(expected, actual) => (CaseVerdict::Passed, None),
        ExecutionResult::Success(actual) => (
            CaseVerdict::WrongAnswer,
            Some(format!("Expected {}, got {}", expected, actual)),
        ),
        ExecutionResult::CompileError(diagnostic) => (
            CaseVerdict::CompileError,
            Some(format!("Compilation error: {}", diagnostic)),
        ),
        ExecutionResult::RuntimeError(message) => (CaseVerdict::RuntimeError, Some(message.clone())),
        ExecutionResult::TimeoutError(limit) => (
            CaseVerdict::TimeLimitExceeded,
            Some(format!("Time limit exceeded ({}ms)", limit.as_millis())),
        ),
        ExecutionResult::ParseError(reason) => (
            CaseVerdict::ParseError,
            Some(format!("Malformed result: {}", reason)),
        ),
    };

    CaseRecord {
        index,
        verdict,
        message,
        elapsed_ms: elapsed.as_millis() as u64,
    }
}

/// `(passed, total, first_error) → JudgeReport`
pub fn aggregate(passed: usize, total: usize, first_error: Option<String>) -> JudgeReport {
    let success = passed == total;
    JudgeReport {
        success,
        passed_tests: passed,
        total_tests: total,
        error: if success { None } else { first_error },
    }
}

/// Fold case records into a report; first error wins.
pub fn report_for(cases: &[CaseRecord]) -> JudgeReport {
    let passed = cases.iter().filter(|c| c.passed()).count();
    let first_error = cases
        .iter()
        .find(|c| !c.passed())
        .and_then(|c| c.message.clone());
    aggregate(passed, cases.len(), first_error)
}
