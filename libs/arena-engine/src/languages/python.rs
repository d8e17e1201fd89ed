use arena_common::types::{EntryPoint, Language, TestCase, ValueKind};
use serde_json::Value;
use std::path::Path;

use super::{int_of, ints_of, join_ints};
use crate::adapter::{entry_name, ordered_arguments, LanguageAdapter, SourceArtifact};
use crate::config::{LanguageConfig, ToolCommand};
use crate::error::JudgeError;
use crate::executor::CommandSpec;
use crate::workspace::Workspace;

pub const SOURCE_FILE: &str = "main.py";

/// Interpreted: no compile step, one interpreter per test case.
#[derive(Debug, Clone)]
pub struct PythonAdapter {
    interpreter: ToolCommand,
}

impl Default for PythonAdapter {
    fn default() -> Self {
        Self {
            interpreter: ToolCommand::new("python3", ["-B"]),
        }
    }
}

impl PythonAdapter {
    pub fn new(interpreter: ToolCommand) -> Self {
        Self { interpreter }
    }

    pub fn from_config(config: Option<&LanguageConfig>) -> Self {
        match config.and_then(|c| c.run.clone()) {
            Some(interpreter) => Self::new(interpreter),
            None => Self::default(),
        }
    }
}

/// Python literal for a structured value of the given shape.
fn literal(kind: ValueKind, value: &Value) -> String {
    match kind {
        ValueKind::Int => int_of(value).to_string(),
        ValueKind::IntArray => format!("[{}]", join_ints(&ints_of(value))),
        ValueKind::Bool => {
            if value.as_bool().unwrap_or(false) {
                "True".to_string()
            } else {
                "False".to_string()
            }
        }
        // JSON string escapes are a subset of Python's.
        ValueKind::String => value.to_string(),
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn build_driver(
        &self,
        user_code: &str,
        entry: &EntryPoint,
        case: &TestCase,
    ) -> Result<SourceArtifact, JudgeError> {
        let name = entry_name(entry, Language::Python)?;
        let args = ordered_arguments(entry, case)?
            .into_iter()
            .map(|(param, value)| literal(param.kind, value))
            .collect::<Vec<_>>()
            .join(", ");

        let contents = format!(
            r#"{user_code}


import json as _arena_json


def _arena_main():
    try:
        _arena_result = {name}({args})
    except BaseException as _arena_error:
        _arena_message = str(_arena_error) or type(_arena_error).__name__
        print("\nERROR:" + " ".join(_arena_message.splitlines()), flush=True)
        return
    try:
        _arena_payload = _arena_json.dumps(_arena_result, separators=(",", ":"))
    except (TypeError, ValueError):
        _arena_payload = repr(_arena_result)
    print("\nRESULT:" + _arena_payload, flush=True)


_arena_main()
"#
        );

        Ok(SourceArtifact {
            file_name: SOURCE_FILE.to_string(),
            contents,
        })
    }

    fn compile_command(&self, _workspace: &Workspace, _source: &Path) -> Option<CommandSpec> {
        None
    }

    fn run_command(&self, workspace: &Workspace, source: &Path) -> CommandSpec {
        CommandSpec::new(&self.interpreter.command, workspace.path())
            .args(self.interpreter.args.iter().cloned())
            .arg(source.to_string_lossy())
    }
}
