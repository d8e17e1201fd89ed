use arena_common::types::{EntryPoint, Language, Param, TestCase, ValueKind};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::JudgeError;
use crate::executor::{CommandSpec, ExecError, ProcessExecutor, ProcessOutput};
use crate::sentinel;
use crate::workspace::Workspace;

/// Generated program: the user's code merged with a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    pub file_name: String,
    pub contents: String,
}

/// The adapter's verdict for one execution attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success(Value),
    CompileError(String),
    RuntimeError(String),
    TimeoutError(Duration),
    ParseError(String),
}

/// Language-specific knowledge for one judged language.
///
/// Adapters are declarative: they describe the driver, the compile step and
/// the run step, and leave spawning to the executor.
pub trait LanguageAdapter: Send + Sync {
    fn language(&self) -> Language;

    /// Merge `user_code` with a driver that calls the entry point on
    /// `case.input` and prints a `RESULT:`/`ERROR:` sentinel line.
    fn build_driver(
        &self,
        user_code: &str,
        entry: &EntryPoint,
        case: &TestCase,
    ) -> Result<SourceArtifact, JudgeError>;

    /// Compiler invocation for `source`, `None` for interpreted languages.
    fn compile_command(&self, workspace: &Workspace, source: &Path) -> Option<CommandSpec>;

    fn run_command(&self, workspace: &Workspace, source: &Path) -> CommandSpec;

    fn decode(&self, output: &ProcessOutput, returns: ValueKind) -> ExecutionResult {
        sentinel::decode(output, returns)
    }
}

/// Outcome of the prepare step.
#[derive(Debug)]
pub enum Prepared {
    Ready(CommandSpec),
    /// The toolchain rejected the artifact; no run step for this case.
    Rejected(ExecutionResult),
}

/// Compile `source` if the language needs it and return the command that
/// runs the result.
pub async fn prepare(
    adapter: &dyn LanguageAdapter,
    executor: &ProcessExecutor,
    workspace: &Workspace,
    source: &Path,
    compile_timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Prepared, JudgeError> {
    let Some(compile) = adapter.compile_command(workspace, source) else {
        return Ok(Prepared::Ready(adapter.run_command(workspace, source)));
    };

    debug!(language = %adapter.language(), compiler = %compile.program, "Compiling");
    match executor.run(&compile, compile_timeout, cancel).await {
        Ok(output) if output.success() => Ok(Prepared::Ready(adapter.run_command(workspace, source))),
        Ok(output) => Ok(Prepared::Rejected(ExecutionResult::CompileError(
            compiler_diagnostic(&output),
        ))),
        Err(ExecError::Timeout(limit)) => Ok(Prepared::Rejected(ExecutionResult::TimeoutError(limit))),
        Err(e) => Err(e.into()),
    }
}

fn compiler_diagnostic(output: &ProcessOutput) -> String {
    let text = if output.stderr.trim().is_empty() {
        output.stdout.trim()
    } else {
        output.stderr.trim()
    };
    if text.is_empty() {
        format!("compiler exited with status {:?}", output.exit_code)
    } else {
        text.to_string()
    }
}

impl From<ExecError> for JudgeError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Spawn { program, source } if source.kind() == std::io::ErrorKind::NotFound => {
                JudgeError::ToolchainMissing { program, source }
            }
            ExecError::Cancelled => JudgeError::Cancelled,
            other => JudgeError::Internal(other.to_string()),
        }
    }
}

/// Input values of `case` in parameter order, or an internal error when the
/// case does not fit the entry point.
pub(crate) fn ordered_arguments<'a>(
    entry: &'a EntryPoint,
    case: &'a TestCase,
) -> Result<Vec<(&'a Param, &'a Value)>, JudgeError> {
    let args = entry
        .arguments(&case.input)
        .ok_or_else(|| JudgeError::Internal("test case input does not match entry point".to_string()))?;
    for (param, value) in &args {
        if !param.kind.matches(value) {
            return Err(JudgeError::Internal(format!(
                "test case parameter '{}' is not a {}",
                param.name,
                param.kind.describe()
            )));
        }
    }
    Ok(args)
}

pub(crate) fn entry_name<'a>(entry: &'a EntryPoint, language: Language) -> Result<&'a str, JudgeError> {
    entry
        .name_for(language)
        .ok_or_else(|| JudgeError::Internal(format!("challenge has no {} entry point", language)))
}
