use arena_common::types::{EntryPoint, Language, TestCase, ValueKind};
use serde_json::Value;
use std::path::Path;

use super::{int_of, ints_of, join_ints, quote_string};
use crate::adapter::{entry_name, ordered_arguments, LanguageAdapter, SourceArtifact};
use crate::config::{LanguageConfig, ToolCommand};
use crate::error::JudgeError;
use crate::executor::CommandSpec;
use crate::workspace::Workspace;

pub const SOURCE_FILE: &str = "Main.java";
pub const MAIN_CLASS: &str = "Main";

/// User code declares class `Solution`; the driver is class `Main` in the
/// same compilation unit. Both class files land in the attempt's workspace.
#[derive(Debug, Clone)]
pub struct JavaAdapter {
    compiler: ToolCommand,
    runtime: ToolCommand,
}

impl Default for JavaAdapter {
    fn default() -> Self {
        Self {
            compiler: ToolCommand::new("javac", ["-encoding", "UTF-8"]),
            runtime: ToolCommand::new("java", ["-Xss64m"]),
        }
    }
}

impl JavaAdapter {
    pub fn new(compiler: ToolCommand, runtime: ToolCommand) -> Self {
        Self { compiler, runtime }
    }

    pub fn from_config(config: Option<&LanguageConfig>) -> Self {
        let defaults = Self::default();
        Self {
            compiler: config
                .and_then(|c| c.compile.clone())
                .unwrap_or(defaults.compiler),
            runtime: config.and_then(|c| c.run.clone()).unwrap_or(defaults.runtime),
        }
    }
}

fn java_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Int => "int",
        ValueKind::IntArray => "int[]",
        ValueKind::Bool => "boolean",
        ValueKind::String => "String",
    }
}

fn literal(kind: ValueKind, value: &Value) -> String {
    match kind {
        ValueKind::Int => int_of(value).to_string(),
        ValueKind::IntArray => format!("new int[] {{{}}}", join_ints(&ints_of(value))),
        ValueKind::Bool => value.as_bool().unwrap_or(false).to_string(),
        ValueKind::String => quote_string(value.as_str().unwrap_or_default()),
    }
}

const ENCODERS: &str = r#"    private static String arenaEncode(int value) {
        return Integer.toString(value);
    }

    private static String arenaEncode(boolean value) {
        return value ? "true" : "false";
    }

    private static String arenaEncode(int[] values) {
        if (values == null) {
            return "null";
        }
        StringBuilder out = new StringBuilder("[");
        for (int i = 0; i < values.length; i++) {
            if (i > 0) {
                out.append(',');
            }
            out.append(values[i]);
        }
        return out.append(']').toString();
    }

    private static String arenaEncode(String value) {
        if (value == null) {
            return "null";
        }
        StringBuilder out = new StringBuilder("\"");
        for (int i = 0; i < value.length(); i++) {
            char c = value.charAt(i);
            switch (c) {
                case '"': out.append("\\\""); break;
                case '\\': out.append("\\\\"); break;
                case '\n': out.append("\\n"); break;
                case '\r': out.append("\\r"); break;
                case '\t': out.append("\\t"); break;
                default:
                    if (c < 0x20) {
                        out.append(String.format("\\u%04x", (int) c));
                    } else {
                        out.append(c);
                    }
            }
        }
        return out.append('"').toString();
    }
"#;

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn build_driver(
        &self,
        user_code: &str,
        entry: &EntryPoint,
        case: &TestCase,
    ) -> Result<SourceArtifact, JudgeError> {
        let method = entry_name(entry, Language::Java)?;
        let arguments = ordered_arguments(entry, case)?;

        let mut locals = String::new();
        let mut names = Vec::with_capacity(arguments.len());
        for (index, (param, value)) in arguments.iter().enumerate() {
            let local = format!("arenaArg{}", index);
            locals.push_str(&format!(
                "        {} {} = {};\n",
                java_type(param.kind),
                local,
                literal(param.kind, value)
            ));
            names.push(local);
        }
        let return_type = java_type(entry.returns);
        let call_args = names.join(", ");

        let contents = format!(
            r#"{user_code}

public class Main {{
    public static void main(String[] args) {{
{locals}        {return_type} arenaResult;
        try {{
            arenaResult = new Solution().{method}({call_args});
        }} catch (Throwable arenaError) {{
            String arenaMessage = arenaError.getMessage();
            if (arenaMessage == null || arenaMessage.isEmpty()) {{
                arenaMessage = arenaError.getClass().getName();
            }}
            System.out.println();
            System.out.println("ERROR:" + arenaMessage.replace('\n', ' ').replace('\r', ' '));
            System.out.flush();
            return;
        }}
        System.out.println();
        System.out.println("RESULT:" + arenaEncode(arenaResult));
        System.out.flush();
    }}

{ENCODERS}}}
"#
        );

        Ok(SourceArtifact {
            file_name: SOURCE_FILE.to_string(),
            contents,
        })
    }

    fn compile_command(&self, workspace: &Workspace, source: &Path) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&self.compiler.command, workspace.path())
                .args(self.compiler.args.iter().cloned())
                .args(["-d", "."])
                .arg(source.to_string_lossy()),
        )
    }

    fn run_command(&self, workspace: &Workspace, _source: &Path) -> CommandSpec {
        CommandSpec::new(&self.runtime.command, workspace.path())
            .args(self.runtime.args.iter().cloned())
            .args(["-cp", ".", MAIN_CLASS])
            .env_remove("JAVA_TOOL_OPTIONS")
            .env_remove("_JAVA_OPTIONS")
    }
}
