use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    C,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Python, Language::Java, Language::C];

    /// Resolve a wire tag ("python", "java", "c") to a language.
    pub fn from_str(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "c" => Some(Language::C),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user submission as received from the caller.
///
/// The language stays a raw tag until the harness resolves it against the
/// adapter registry, so an unknown tag is reported as an unsupported
/// language rather than a malformed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub code: String,
    pub language: String,
    pub challenge_id: String,
}

/// Shape of an entry-point parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// 32-bit signed integer (`int` in Java and C).
    Int,
    IntArray,
    Bool,
    String,
}

impl ValueKind {
    /// Check that a JSON value has this shape.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::Int => is_int32(value),
            ValueKind::IntArray => value
                .as_array()
                .map(|items| items.iter().all(is_int32))
                .unwrap_or(false),
            ValueKind::Bool => value.is_boolean(),
            ValueKind::String => value.is_string(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ValueKind::Int => "int",
            ValueKind::IntArray => "int array",
            ValueKind::Bool => "bool",
            ValueKind::String => "string",
        }
    }
}

fn is_int32(value: &Value) -> bool {
    value
        .as_i64()
        .map(|n| n >= i32::MIN as i64 && n <= i32::MAX as i64)
        .unwrap_or(false)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub kind: ValueKind,
}

/// The function every submission must implement for one challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Entry name per language: a function for Python and C, a method on
    /// class `Solution` for Java.
    pub names: HashMap<Language, String>,
    pub params: Vec<Param>,
    pub returns: ValueKind,
}

impl EntryPoint {
    pub fn name_for(&self, language: Language) -> Option<&str> {
        self.names.get(&language).map(String::as_str)
    }

    /// Input values in parameter order.
    ///
    /// Returns `None` when the input object is missing a declared parameter;
    /// catalogs validate cases on load so this only happens for hand-built
    /// suites.
    pub fn arguments<'a>(&self, input: &'a Value) -> Option<Vec<(&Param, &'a Value)>> {
        self.params
            .iter()
            .map(|param| input.get(&param.name).map(|value| (param, value)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Value,
    pub expected: Value,
}

/// Ordered, non-empty sequence of test cases for one challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<TestCase>", into = "Vec<TestCase>")]
pub struct TestSuite(Vec<TestCase>);

impl TestSuite {
    pub fn new(cases: Vec<TestCase>) -> Result<Self, EmptySuite> {
        if cases.is_empty() {
            return Err(EmptySuite);
        }
        Ok(Self(cases))
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a test suite needs at least one test case")]
pub struct EmptySuite;

impl TryFrom<Vec<TestCase>> for TestSuite {
    type Error = EmptySuite;

    fn try_from(cases: Vec<TestCase>) -> Result<Self, Self::Error> {
        TestSuite::new(cases)
    }
}

impl From<TestSuite> for Vec<TestCase> {
    fn from(suite: TestSuite) -> Self {
        suite.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    /// Wall-clock limit for one test case run; the engine default applies
    /// when absent.
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    pub entry_point: EntryPoint,
    #[serde(default)]
    pub templates: HashMap<Language, String>,
    pub test_cases: TestSuite,
}

/// Aggregated verdict for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeReport {
    pub success: bool,
    pub passed_tests: usize,
    pub total_tests: usize,
    pub error: Option<String>,
}
