/// Test Harness - One Submission Against One Test Suite
///
/// **States:** Validating → Iterating → Completed
///
/// Validation resolves the challenge, the language adapter (which the
/// challenge must offer an entry point for) and the source size before
/// anything touches the filesystem; a rejected submission never spawns a
/// process.
///
/// Iteration is strictly sequential. Each case is its own execution attempt:
///
/// ```text
/// acquire workspace → build driver → write source → prepare (compile)
///     → run → decode → compare → release workspace
/// ```
///
/// Per-case failures (compile error, crash, timeout, malformed output) are
/// recorded and the next case runs. Only environment failures and
/// cancellation abort the suite.
use arena_common::catalog::ChallengeCatalog;
use arena_common::config::Config;
use arena_common::types::{Challenge, JudgeReport, Language, Submission, TestCase};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::adapter::{prepare, ExecutionResult, LanguageAdapter, Prepared};
use crate::error::JudgeError;
use crate::evaluator::{evaluate_case, report_for, CaseRecord};
use crate::executor::{ExecError, ProcessExecutor};
use crate::registry::AdapterRegistry;
use crate::workspace::{Workspace, WorkspaceManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgeLimits {
    /// Run timeout for challenges without their own time limit.
    pub default_run_timeout: Duration,
    pub compile_timeout: Duration,
    pub max_source_bytes: usize,
}

impl Default for JudgeLimits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl JudgeLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_run_timeout: Duration::from_millis(config.run_timeout_ms),
            compile_timeout: Duration::from_millis(config.compile_timeout_ms),
            max_source_bytes: config.max_source_bytes,
        }
    }

    fn run_timeout(&self, challenge: &Challenge) -> Duration {
        challenge
            .time_limit_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_run_timeout)
    }
}

/// Report plus the per-case detail behind it.
#[derive(Debug, Clone)]
pub struct SuiteRun {
    /// Language the submission's tag resolved to.
    pub language: Language,
    pub report: JudgeReport,
    pub cases: Vec<CaseRecord>,
}

pub struct Judge {
    catalog: Arc<dyn ChallengeCatalog>,
    adapters: AdapterRegistry,
    workspaces: WorkspaceManager,
    executor: ProcessExecutor,
    limits: JudgeLimits,
}

impl Judge {
    pub fn new(
        catalog: Arc<dyn ChallengeCatalog>,
        adapters: AdapterRegistry,
        workspaces: WorkspaceManager,
        limits: JudgeLimits,
    ) -> Self {
        Self {
            catalog,
            adapters,
            workspaces,
            executor: ProcessExecutor::new(),
            limits,
        }
    }

    pub fn with_executor(mut self, executor: ProcessExecutor) -> Self {
        self.executor = executor;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn ChallengeCatalog> {
        &self.catalog
    }

    pub fn adapters(&self) -> &AdapterRegistry {
        &self.adapters
    }

    pub fn limits(&self) -> &JudgeLimits {
        &self.limits
    }

    fn validate(
        &self,
        submission: &Submission,
    ) -> Result<(Arc<Challenge>, Arc<dyn LanguageAdapter>), JudgeError> {
        let challenge = self
            .catalog
            .challenge(&submission.challenge_id)
            .ok_or_else(|| JudgeError::UnsupportedChallenge(submission.challenge_id.clone()))?;
        let adapter = self
            .adapters
            .get(&submission.language)
            .ok_or_else(|| JudgeError::UnsupportedLanguage(submission.language.clone()))?;
        if challenge.entry_point.name_for(adapter.language()).is_none() {
            return Err(JudgeError::LanguageNotOffered {
                challenge_id: challenge.id.clone(),
                language: adapter.language(),
            });
        }
        if submission.code.len() > self.limits.max_source_bytes {
            return Err(JudgeError::SourceTooLarge {
                limit: self.limits.max_source_bytes,
            });
        }
        Ok((challenge, adapter))
    }

    /// Judge `submission` against its challenge's suite.
    #[instrument(
        name = "judge",
        skip(self, submission, cancel),
        fields(
            submission_id = %Uuid::new_v4(),
            challenge_id = %submission.challenge_id,
            language = %submission.language,
        )
    )]
    pub async fn judge(
        &self,
        submission: &Submission,
        cancel: &CancellationToken,
    ) -> Result<SuiteRun, JudgeError> {
        let (challenge, adapter) = self.validate(submission)?;
        let run_timeout = self.limits.run_timeout(&challenge);
        let total = challenge.test_cases.len();
        info!(
            total_tests = total,
            run_timeout_ms = run_timeout.as_millis() as u64,
            "Judging submission"
        );

        let started = Instant::now();
        let mut cases = Vec::with_capacity(total);
        for (index, case) in challenge.test_cases.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(completed = index, total_tests = total, "Judging cancelled");
                return Err(JudgeError::Cancelled);
            }

            let record = self
                .run_case(adapter.as_ref(), &submission.code, &challenge, index, case, run_timeout, cancel)
                .await?;
            debug!(
                case = index,
                verdict = record.verdict.as_str(),
                elapsed_ms = record.elapsed_ms,
                detail = record.message.as_deref().unwrap_or(""),
                "Case finished"
            );
            cases.push(record);
        }

        let report = report_for(&cases);
        info!(
            passed_tests = report.passed_tests,
            total_tests = report.total_tests,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Judging complete"
        );
        Ok(SuiteRun {
            language: adapter.language(),
            report,
            cases,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_case(
        &self,
        adapter: &dyn LanguageAdapter,
        code: &str,
        challenge: &Challenge,
        index: usize,
        case: &TestCase,
        run_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<CaseRecord, JudgeError> {
        let workspace = self.workspaces.acquire().await.map_err(JudgeError::Workspace)?;
        let started = Instant::now();

        let outcome = self
            .attempt(adapter, &workspace, code, challenge, case, run_timeout, cancel)
            .await;
        workspace.release().await;

        let result = outcome?;
        Ok(evaluate_case(index, &result, &case.expected, started.elapsed()))
    }

    #[allow(clippy::too_many_arguments)]
    async fn attempt(
        &self,
        adapter: &dyn LanguageAdapter,
        workspace: &Workspace,
        code: &str,
        challenge: &Challenge,
        case: &TestCase,
        run_timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, JudgeError> {
        let artifact = adapter.build_driver(code, &challenge.entry_point, case)?;
        let source = workspace
            .write_source(&artifact)
            .await
            .map_err(JudgeError::Workspace)?;

        let command = match prepare(
            adapter,
            &self.executor,
            workspace,
            &source,
            self.limits.compile_timeout,
            cancel,
        )
        .await?
        {
            Prepared::Ready(command) => command,
            Prepared::Rejected(result) => return Ok(result),
        };

        match self.executor.run(&command, run_timeout, cancel).await {
            Ok(output) => Ok(adapter.decode(&output, challenge.entry_point.returns)),
            Err(ExecError::Timeout(limit)) => Ok(ExecutionResult::TimeoutError(limit)),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for Judge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Judge")
            .field("adapters", &self.adapters)
            .field("workspace_root", &self.workspaces.root())
            .field("limits", &self.limits)
            .finish()
    }
}
