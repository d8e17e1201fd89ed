/// Harness tests
///
/// The fake adapters below drive the harness through `sh`, so validation,
/// isolation, timeout and cancellation behaviour is covered on any Unix box.
/// The end-to-end tests at the bottom use the real toolchains and skip
/// themselves when `python3`, `javac` or `gcc` is not installed.

#[cfg(test)]
mod fake_adapter_tests {
    use crate::adapter::{LanguageAdapter, SourceArtifact};
    use crate::error::JudgeError;
    use crate::evaluator::CaseVerdict;
    use crate::executor::CommandSpec;
    use crate::harness::{Judge, JudgeLimits};
    use crate::registry::AdapterRegistry;
    use crate::workspace::{Workspace, WorkspaceManager};
    use arena_common::catalog::JsonCatalog;
    use arena_common::types::{
        Challenge, EntryPoint, Language, Param, Submission, TestCase, TestSuite, ValueKind,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio_util::sync::CancellationToken;

    type Script = Box<dyn Fn(&str, &TestCase) -> String + Send + Sync>;

    /// Shell "language": the driver is a script chosen per test case.
    struct ShellAdapter {
        language: Language,
        script: Script,
        compile: Option<String>,
        drivers_built: Arc<AtomicUsize>,
    }

    impl ShellAdapter {
        fn new(script: impl Fn(&str, &TestCase) -> String + Send + Sync + 'static) -> Self {
            Self {
                language: Language::Python,
                script: Box::new(script),
                compile: None,
                drivers_built: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn as_language(mut self, language: Language) -> Self {
            self.language = language;
            self
        }

        fn with_compile(mut self, compile: &str) -> Self {
            self.compile = Some(compile.to_string());
            self
        }
    }

    impl LanguageAdapter for ShellAdapter {
        fn language(&self) -> Language {
            self.language
        }

        fn build_driver(
            &self,
            user_code: &str,
            _entry: &EntryPoint,
            case: &TestCase,
        ) -> Result<SourceArtifact, JudgeError> {
            self.drivers_built.fetch_add(1, Ordering::SeqCst);
            Ok(SourceArtifact {
                file_name: "driver.sh".to_string(),
                contents: (self.script)(user_code, case),
            })
        }

        fn compile_command(&self, workspace: &Workspace, _source: &Path) -> Option<CommandSpec> {
            self.compile
                .as_ref()
                .map(|script| CommandSpec::new("sh", workspace.path()).args(["-c", script.as_str()]))
        }

        fn run_command(&self, workspace: &Workspace, source: &Path) -> CommandSpec {
            CommandSpec::new("sh", workspace.path()).arg(source.to_string_lossy())
        }
    }

    fn two_sum_challenge(time_limit_ms: Option<u64>) -> Challenge {
        Challenge {
            id: "easy-1".to_string(),
            title: "Two Sum".to_string(),
            time_limit_ms,
            entry_point: EntryPoint {
                names: HashMap::from([
                    (Language::Python, "two_sum".to_string()),
                    (Language::Java, "twoSum".to_string()),
                    (Language::C, "twoSum".to_string()),
                ]),
                params: vec![
                    Param { name: "nums".to_string(), kind: ValueKind::IntArray },
                    Param { name: "target".to_string(), kind: ValueKind::Int },
                ],
                returns: ValueKind::IntArray,
            },
            templates: HashMap::new(),
            test_cases: TestSuite::new(vec![
                TestCase {
                    input: json!({"nums": [2, 7, 11, 15], "target": 9}),
                    expected: json!([0, 1]),
                },
                TestCase {
                    input: json!({"nums": [3, 2, 4], "target": 6}),
                    expected: json!([1, 2]),
                },
                TestCase {
                    input: json!({"nums": [3, 3], "target": 6}),
                    expected: json!([0, 1]),
                },
            ])
            .unwrap(),
        }
    }

    fn scratch_root() -> PathBuf {
        std::env::temp_dir().join(format!("arena-harness-test-{}", uuid::Uuid::new_v4()))
    }

    fn judge_with(root: &Path, challenge: Challenge, adapters: AdapterRegistry) -> Judge {
        let catalog = JsonCatalog::from_challenges(vec![challenge]).unwrap();
        Judge::new(
            Arc::new(catalog),
            adapters,
            WorkspaceManager::new(root),
            JudgeLimits::default(),
        )
    }

    fn registry_of(adapter: ShellAdapter) -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        registry.register(adapter);
        registry
    }

    fn submission(language: &str, challenge_id: &str) -> Submission {
        Submission {
            code: "# user code".to_string(),
            language: language.to_string(),
            challenge_id: challenge_id.to_string(),
        }
    }

    fn echo_expected(_code: &str, case: &TestCase) -> String {
        format!("echo 'RESULT:{}'\n", case.expected)
    }

    fn leftover_entries(root: &Path) -> usize {
        std::fs::read_dir(root).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_all_cases_pass() {
        let root = scratch_root();
        let judge = judge_with(&root, two_sum_challenge(None), registry_of(ShellAdapter::new(echo_expected)));

        let run = judge
            .judge(&submission("python", "easy-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(run.report.success);
        assert_eq!(run.report.passed_tests, 3);
        assert_eq!(run.report.total_tests, 3);
        assert_eq!(run.report.error, None);
        assert!(run.cases.iter().all(|c| c.verdict == CaseVerdict::Passed));
        assert_eq!(leftover_entries(&root), 0, "workspaces must be released");
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_reversed_answers_pass() {
        let root = scratch_root();
        let reversed = |_: &str, case: &TestCase| {
            let mut values: Vec<i64> = case
                .expected
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_i64().unwrap())
                .collect();
            values.reverse();
            format!("echo 'RESULT:{}'\n", json!(values))
        };
        let judge = judge_with(&root, two_sum_challenge(None), registry_of(ShellAdapter::new(reversed)));

        let run = judge
            .judge(&submission("python", "easy-1"), &CancellationToken::new())
            .await
            .unwrap();
        assert!(run.report.success);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_constant_answer_reports_first_mismatch() {
        let root = scratch_root();
        let judge = judge_with(
            &root,
            two_sum_challenge(None),
            registry_of(ShellAdapter::new(|_: &str, _: &TestCase| "echo 'RESULT:[0,0]'\n".to_string())),
        );

        let run = judge
            .judge(&submission("python", "easy-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(!run.report.success);
        assert_eq!(run.report.passed_tests, 0);
        assert_eq!(run.report.total_tests, 3);
        assert_eq!(run.report.error.as_deref(), Some("Expected [0,1], got [0,0]"));
        assert!(run.cases.iter().all(|c| c.verdict == CaseVerdict::WrongAnswer));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_unknown_challenge_never_reaches_adapter() {
        let root = scratch_root();
        let adapter = ShellAdapter::new(echo_expected);
        let built = adapter.drivers_built.clone();
        let judge = judge_with(&root, two_sum_challenge(None), registry_of(adapter));

        let err = judge
            .judge(&submission("python", "hard-99"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, JudgeError::UnsupportedChallenge(ref id) if id == "hard-99"));
        assert_eq!(err.to_string(), "Challenge not supported yet: hard-99");
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert!(!root.exists(), "no workspace may be created");
    }

    #[tokio::test]
    async fn test_unregistered_language_spawns_nothing() {
        let root = scratch_root();
        let adapter = ShellAdapter::new(echo_expected).as_language(Language::Java);
        let built = adapter.drivers_built.clone();
        let judge = judge_with(&root, two_sum_challenge(None), registry_of(adapter));

        // Known tag without a registered adapter, then an unknown tag.
        for tag in ["python", "rust"] {
            let err = judge
                .judge(&submission(tag, "easy-1"), &CancellationToken::new())
                .await
                .unwrap_err();
            assert!(matches!(err, JudgeError::UnsupportedLanguage(ref t) if t == tag));
            assert!(err.is_client_error());
        }
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_oversized_source_rejected() {
        let root = scratch_root();
        let adapter = ShellAdapter::new(echo_expected);
        let built = adapter.drivers_built.clone();
        let catalog = JsonCatalog::from_challenges(vec![two_sum_challenge(None)]).unwrap();
        let limits = JudgeLimits {
            max_source_bytes: 16,
            ..JudgeLimits::default()
        };
        let judge = Judge::new(Arc::new(catalog), registry_of(adapter), WorkspaceManager::new(&root), limits);

        let mut big = submission("python", "easy-1");
        big.code = "x".repeat(17);
        let err = judge.judge(&big, &CancellationToken::new()).await.unwrap_err();

        assert!(matches!(err, JudgeError::SourceTooLarge { limit: 16 }));
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_language_missing_from_challenge_is_rejected() {
        let root = scratch_root();
        let adapter = ShellAdapter::new(echo_expected).as_language(Language::Java);
        let built = adapter.drivers_built.clone();
        let mut challenge = two_sum_challenge(None);
        challenge.entry_point.names.remove(&Language::Java);
        let judge = judge_with(&root, challenge, registry_of(adapter));

        let err = judge
            .judge(&submission("java", "easy-1"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            JudgeError::LanguageNotOffered { ref challenge_id, language: Language::Java } if challenge_id == "easy-1"
        ));
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Challenge easy-1 is not available in java");
        assert_eq!(built.load(Ordering::SeqCst), 0);
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_run_carries_resolved_language() {
        let root = scratch_root();
        let judge = judge_with(&root, two_sum_challenge(None), registry_of(ShellAdapter::new(echo_expected)));

        let run = judge
            .judge(&submission("  PyThOn ", "easy-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.language, Language::Python);
        assert!(run.report.success);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_sentinel_after_megabytes_of_output_is_kept() {
        let root = scratch_root();
        let noisy = |_: &str, case: &TestCase| {
            format!(
                "head -c 1100000 /dev/zero | tr '\\0' x\necho\necho 'RESULT:{}'\n",
                case.expected
            )
        };
        let judge = judge_with(&root, two_sum_challenge(None), registry_of(ShellAdapter::new(noisy)));

        let run = judge
            .judge(&submission("python", "easy-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(run.report.success, "{:?}", run.report.error);
        assert_eq!(run.report.passed_tests, 3);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_compile_error_reported_for_every_case_without_run() {
        let root = scratch_root();
        // The run step would pass every case if it were ever reached.
        let adapter = ShellAdapter::new(echo_expected)
            .with_compile("echo 'main.c:1:1: error: expected declaration' >&2; exit 1");
        let judge = judge_with(&root, two_sum_challenge(None), registry_of(adapter));

        let run = judge
            .judge(&submission("python", "easy-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.report.passed_tests, 0);
        assert_eq!(run.report.total_tests, 3);
        assert_eq!(
            run.report.error.as_deref(),
            Some("Compilation error: main.c:1:1: error: expected declaration")
        );
        assert!(run.cases.iter().all(|c| c.verdict == CaseVerdict::CompileError));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_timeout_kills_case_and_later_cases_run() {
        let root = scratch_root();
        let adapter = ShellAdapter::new(|_: &str, case: &TestCase| {
            if case.input["nums"] == json!([3, 2, 4]) {
                "sleep 30\n".to_string()
            } else {
                echo_expected("", case)
            }
        });
        let judge = judge_with(&root, two_sum_challenge(Some(300)), registry_of(adapter));

        let started = Instant::now();
        let run = judge
            .judge(&submission("python", "easy-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(run.report.passed_tests, 2);
        assert_eq!(run.report.error.as_deref(), Some("Time limit exceeded (300ms)"));
        assert_eq!(run.cases[0].verdict, CaseVerdict::Passed);
        assert_eq!(run.cases[1].verdict, CaseVerdict::TimeLimitExceeded);
        assert_eq!(run.cases[2].verdict, CaseVerdict::Passed);
        assert_eq!(leftover_entries(&root), 0);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_runtime_failures_do_not_abort_suite() {
        let root = scratch_root();
        let adapter = ShellAdapter::new(|_: &str, case: &TestCase| {
            if case.input["target"] == json!(9) {
                "echo 'Traceback: boom' >&2; exit 1\n".to_string()
            } else if case.input["nums"] == json!([3, 2, 4]) {
                "echo 'RESULT:[1,2'\n".to_string()
            } else {
                "echo 'ERROR:index out of range'\n".to_string()
            }
        });
        let judge = judge_with(&root, two_sum_challenge(None), registry_of(adapter));

        let run = judge
            .judge(&submission("python", "easy-1"), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(run.report.passed_tests, 0);
        assert_eq!(run.report.error.as_deref(), Some("Traceback: boom"));
        assert_eq!(run.cases[0].verdict, CaseVerdict::RuntimeError);
        assert_eq!(run.cases[1].verdict, CaseVerdict::ParseError);
        assert_eq!(run.cases[2].verdict, CaseVerdict::RuntimeError);
        assert_eq!(run.cases[2].message.as_deref(), Some("index out of range"));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_cancellation_stops_suite_and_releases_workspace() {
        let root = scratch_root();
        let adapter = ShellAdapter::new(|_: &str, _: &TestCase| "sleep 30\n".to_string());
        let judge = judge_with(&root, two_sum_challenge(Some(60_000)), registry_of(adapter));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = judge
            .judge(&submission("python", "easy-1"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, JudgeError::Cancelled));
        assert!(!err.is_client_error());
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(leftover_entries(&root), 0);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn test_missing_toolchain_is_internal() {
        struct MissingToolchain;

        impl LanguageAdapter for MissingToolchain {
            fn language(&self) -> Language {
                Language::C
            }

            fn build_driver(
                &self,
                _user_code: &str,
                _entry: &EntryPoint,
                _case: &TestCase,
            ) -> Result<SourceArtifact, JudgeError> {
                Ok(SourceArtifact {
                    file_name: "main.c".to_string(),
                    contents: String::new(),
                })
            }

            fn compile_command(&self, workspace: &Workspace, _source: &Path) -> Option<CommandSpec> {
                Some(CommandSpec::new("arena-no-such-compiler", workspace.path()))
            }

            fn run_command(&self, workspace: &Workspace, _source: &Path) -> CommandSpec {
                CommandSpec::new("./main", workspace.path())
            }
        }

        let root = scratch_root();
        let mut registry = AdapterRegistry::new();
        registry.register(MissingToolchain);
        let judge = judge_with(&root, two_sum_challenge(None), registry);

        let err = judge
            .judge(&submission("c", "easy-1"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::ToolchainMissing { ref program, .. } if program == "arena-no-such-compiler"));
        assert!(!err.is_client_error());
        assert_eq!(leftover_entries(&root), 0);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_are_isolated() {
        let root = scratch_root();
        // Each driver writes a marker and fails if another attempt's marker
        // is visible in its directory.
        let adapter = ShellAdapter::new(|code: &str, case: &TestCase| {
            format!(
                "[ -e marker ] && {{ echo 'ERROR:shared workspace'; exit 0; }}\necho '{}' > marker\nsleep 0.05\necho 'RESULT:{}'\n",
                code, case.expected
            )
        });
        let judge = Arc::new(judge_with(&root, two_sum_challenge(None), registry_of(adapter)));

        let mut handles = Vec::new();
        for n in 0..8 {
            let judge = judge.clone();
            handles.push(tokio::spawn(async move {
                let mut sub = submission("python", "easy-1");
                sub.code = format!("submission-{}", n);
                judge.judge(&sub, &CancellationToken::new()).await
            }));
        }

        for handle in handles {
            let run = handle.await.unwrap().unwrap();
            assert!(run.report.success, "{:?}", run.report);
        }
        assert_eq!(leftover_entries(&root), 0);
        let _ = std::fs::remove_dir_all(&root);
    }
}

#[cfg(test)]
mod toolchain_tests {
    use crate::harness::{Judge, JudgeLimits};
    use crate::registry::AdapterRegistry;
    use crate::workspace::WorkspaceManager;
    use arena_common::catalog::JsonCatalog;
    use arena_common::types::{JudgeReport, Submission};
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    const CATALOG: &str = r#"{
        "challenges": [
            {
                "id": "easy-1",
                "title": "Two Sum",
                "entryPoint": {
                    "names": {"python": "two_sum", "java": "twoSum", "c": "twoSum"},
                    "params": [
                        {"name": "nums", "kind": "int_array"},
                        {"name": "target", "kind": "int"}
                    ],
                    "returns": "int_array"
                },
                "testCases": [
                    {"input": {"nums": [2, 7, 11, 15], "target": 9}, "expected": [0, 1]},
                    {"input": {"nums": [3, 2, 4], "target": 6}, "expected": [1, 2]},
                    {"input": {"nums": [3, 3], "target": 6}, "expected": [0, 1]}
                ]
            },
            {
                "id": "easy-2",
                "title": "Palindrome Number",
                "entryPoint": {
                    "names": {"python": "is_palindrome", "java": "isPalindrome", "c": "isPalindrome"},
                    "params": [{"name": "x", "kind": "int"}],
                    "returns": "bool"
                },
                "testCases": [
                    {"input": {"x": 121}, "expected": true},
                    {"input": {"x": -121}, "expected": false},
                    {"input": {"x": 10}, "expected": false}
                ]
            }
        ]
    }"#;

    const PYTHON_TWO_SUM: &str = r#"def two_sum(nums, target):
    seen = {}
    for i, n in enumerate(nums):
        if target - n in seen:
            return [seen[target - n], i]
        seen[n] = i
    return []
"#;

    const JAVA_TWO_SUM: &str = r#"import java.util.*;

class Solution {
    public int[] twoSum(int[] nums, int target) {
        Map<Integer, Integer> seen = new HashMap<>();
        for (int i = 0; i < nums.length; i++) {
            Integer j = seen.get(target - nums[i]);
            if (j != null) {
                return new int[] {j, i};
            }
            seen.put(nums[i], i);
        }
        return new int[0];
    }
}
"#;

    const C_TWO_SUM: &str = r#"#include <stdlib.h>

int* twoSum(int* nums, int numsSize, int target, int* returnSize) {
    int* result = malloc(2 * sizeof(int));
    for (int i = 0; i < numsSize; i++) {
        for (int j = i + 1; j < numsSize; j++) {
            if (nums[i] + nums[j] == target) {
                result[0] = i;
                result[1] = j;
                *returnSize = 2;
                return result;
            }
        }
    }
    *returnSize = 0;
    return result;
}
"#;

    fn available(program: &str, version_flag: &str) -> bool {
        let found = std::process::Command::new(program)
            .arg(version_flag)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !found {
            eprintln!("skipping: {} not installed", program);
        }
        found
    }

    fn judge() -> (Judge, std::path::PathBuf) {
        let root = std::env::temp_dir().join(format!("arena-e2e-{}", uuid::Uuid::new_v4()));
        let catalog = JsonCatalog::from_json(CATALOG).unwrap();
        let judge = Judge::new(
            Arc::new(catalog),
            AdapterRegistry::with_defaults(),
            WorkspaceManager::new(&root),
            JudgeLimits::default(),
        );
        (judge, root)
    }

    async fn run(language: &str, challenge_id: &str, code: &str) -> JudgeReport {
        let (judge, root) = judge();
        let submission = Submission {
            code: code.to_string(),
            language: language.to_string(),
            challenge_id: challenge_id.to_string(),
        };
        let run = judge
            .judge(&submission, &CancellationToken::new())
            .await
            .unwrap();
        let _ = std::fs::remove_dir_all(&root);
        run.report
    }

    fn all_passed() -> JudgeReport {
        JudgeReport {
            success: true,
            passed_tests: 3,
            total_tests: 3,
            error: None,
        }
    }

    #[tokio::test]
    async fn test_python_two_sum() {
        if !available("python3", "--version") {
            return;
        }
        assert_eq!(run("python", "easy-1", PYTHON_TWO_SUM).await, all_passed());
    }

    #[tokio::test]
    async fn test_python_debug_output_does_not_hide_result() {
        if !available("python3", "--version") {
            return;
        }
        let code = "def two_sum(nums, target):\n    print('x' * 1100000)\n    seen = {}\n    for i, n in enumerate(nums):\n        if target - n in seen:\n            return [seen[target - n], i]\n        seen[n] = i\n";
        assert_eq!(run("python", "easy-1", code).await, all_passed());
    }

    #[tokio::test]
    async fn test_python_constant_answer() {
        if !available("python3", "--version") {
            return;
        }
        let code = "def two_sum(nums, target):\n    print('debugging', end='')\n    return [0, 0]\n";
        assert_eq!(
            run("python", "easy-1", code).await,
            JudgeReport {
                success: false,
                passed_tests: 0,
                total_tests: 3,
                error: Some("Expected [0,1], got [0,0]".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_python_exception_and_missing_function() {
        if !available("python3", "--version") {
            return;
        }
        let report = run("python", "easy-1", "def two_sum(nums, target):\n    return [nums[10], 0]\n").await;
        assert_eq!(report.passed_tests, 0);
        assert_eq!(report.error.as_deref(), Some("list index out of range"));

        let report = run("python", "easy-1", "def something_else():\n    pass\n").await;
        assert_eq!(report.error.as_deref(), Some("name 'two_sum' is not defined"));

        let report = run("python", "easy-1", "def two_sum(nums, target)\n    pass\n").await;
        assert!(report.error.unwrap().contains("SyntaxError"));
    }

    #[tokio::test]
    async fn test_python_palindrome() {
        if !available("python3", "--version") {
            return;
        }
        let code = "def is_palindrome(x):\n    return str(x) == str(x)[::-1]\n";
        assert_eq!(run("python", "easy-2", code).await, all_passed());
    }

    #[tokio::test]
    async fn test_java_two_sum() {
        if !available("javac", "-version") {
            return;
        }
        assert_eq!(run("java", "easy-1", JAVA_TWO_SUM).await, all_passed());
    }

    #[tokio::test]
    async fn test_java_compile_error() {
        if !available("javac", "-version") {
            return;
        }
        let report = run("java", "easy-1", "class Solution { public int[] twoSum(int[] nums, int target) { return } }").await;
        assert_eq!(report.passed_tests, 0);
        assert!(report.error.unwrap().starts_with("Compilation error: "));
    }

    #[tokio::test]
    async fn test_java_exception() {
        if !available("javac", "-version") {
            return;
        }
        let code = "class Solution { public int[] twoSum(int[] nums, int target) { throw new IllegalStateException(\"no answer\"); } }";
        let report = run("java", "easy-1", code).await;
        assert_eq!(report.error.as_deref(), Some("no answer"));
    }

    #[tokio::test]
    async fn test_c_two_sum() {
        if !available("gcc", "--version") {
            return;
        }
        assert_eq!(run("c", "easy-1", C_TWO_SUM).await, all_passed());
    }

    #[tokio::test]
    async fn test_c_null_result_and_crash() {
        if !available("gcc", "--version") {
            return;
        }
        let code = "int* twoSum(int* nums, int numsSize, int target, int* returnSize) { *returnSize = 0; return NULL; }";
        let report = run("c", "easy-1", code).await;
        assert_eq!(report.error.as_deref(), Some("Invalid result"));

        let code = "int* twoSum(int* nums, int numsSize, int target, int* returnSize) { int* p = NULL; *p = 1; return p; }";
        let report = run("c", "easy-1", code).await;
        assert_eq!(report.passed_tests, 0);
        assert!(report.error.unwrap().starts_with("Process terminated by signal"));
    }

    #[tokio::test]
    async fn test_c_palindrome() {
        if !available("gcc", "--version") {
            return;
        }
        let code = "bool isPalindrome(int x) {\n    if (x < 0) return false;\n    long r = 0, n = x;\n    while (n > 0) { r = r * 10 + n % 10; n /= 10; }\n    return r == x;\n}\n";
        assert_eq!(run("c", "easy-2", code).await, all_passed());
    }
}
