use arena_common::types::{EntryPoint, Language, TestCase, ValueKind};
use serde_json::Value;
use std::path::Path;

use super::{int_of, ints_of, join_ints, quote_string};
use crate::adapter::{entry_name, ordered_arguments, LanguageAdapter, SourceArtifact};
use crate::config::{LanguageConfig, ToolCommand};
use crate::error::JudgeError;
use crate::executor::CommandSpec;
use crate::workspace::Workspace;

pub const SOURCE_FILE: &str = "main.c";
pub const BINARY_FILE: &str = "main";

/// Calling convention for C entry points:
///
/// - `int_array` parameter `xs` is passed as `int* xs, int xsSize`
/// - an `int_array` return adds a trailing `int* returnSize`; a `NULL`
///   result or negative size is reported as a runtime error
/// - `string` parameters are `char*`, `bool` comes from `<stdbool.h>`
#[derive(Debug, Clone)]
pub struct CAdapter {
    compiler: ToolCommand,
}

impl Default for CAdapter {
    fn default() -> Self {
        Self {
            compiler: ToolCommand::new("gcc", ["-O2", "-std=gnu11"]),
        }
    }
}

impl CAdapter {
    pub fn new(compiler: ToolCommand) -> Self {
        Self { compiler }
    }

    pub fn from_config(config: Option<&LanguageConfig>) -> Self {
        match config.and_then(|c| c.compile.clone()) {
            Some(compiler) => Self::new(compiler),
            None => Self::default(),
        }
    }
}

fn int_literal(n: i64) -> String {
    // `-2147483648` is a unary minus on a long constant in C.
    if n == i32::MIN as i64 {
        "(-2147483647 - 1)".to_string()
    } else {
        n.to_string()
    }
}

/// Local declarations for one argument and the expressions passed to the
/// entry point.
fn declare(index: usize, kind: ValueKind, value: &Value) -> (String, Vec<String>) {
    let local = format!("arena_arg{}", index);
    match kind {
        ValueKind::Int => (
            format!("    int {} = {};\n", local, int_literal(int_of(value))),
            vec![local],
        ),
        ValueKind::Bool => (
            format!("    bool {} = {};\n", local, value.as_bool().unwrap_or(false)),
            vec![local],
        ),
        ValueKind::String => (
            format!(
                "    char {}[] = {};\n",
                local,
                quote_string(value.as_str().unwrap_or_default())
            ),
            vec![local],
        ),
        ValueKind::IntArray => {
            let items = ints_of(value);
            let rendered: Vec<String> = items.iter().map(|n| int_literal(*n)).collect();
            // Zero-length arrays are not standard C.
            let (capacity, init) = if items.is_empty() {
                (1, "0".to_string())
            } else {
                (items.len(), rendered.join(", "))
            };
            let size = format!("{}_size", local);
            (
                format!(
                    "    int {}[{}] = {{{}}};\n    int {} = {};\n",
                    local,
                    capacity,
                    init,
                    size,
                    items.len()
                ),
                vec![local, size],
            )
        }
    }
}

fn c_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Int => "int",
        ValueKind::IntArray => "int*",
        ValueKind::Bool => "bool",
        ValueKind::String => "char*",
    }
}

fn print_result(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Int => "    printf(\"\\nRESULT:%d\\n\", arena_result);\n",
        ValueKind::Bool => "    printf(\"\\nRESULT:%s\\n\", arena_result ? \"true\" : \"false\");\n",
        ValueKind::String => {
            "    if (arena_result == NULL) {\n        printf(\"\\nERROR:Invalid result\\n\");\n        return 0;\n    }\n    printf(\"\\nRESULT:\");\n    arena_print_string(arena_result);\n    printf(\"\\n\");\n"
        }
        ValueKind::IntArray => {
            "    if (arena_result == NULL || arena_return_size < 0) {\n        printf(\"\\nERROR:Invalid result\\n\");\n        return 0;\n    }\n    printf(\"\\nRESULT:[\");\n    for (int i = 0; i < arena_return_size; i++) {\n        printf(i > 0 ? \",%d\" : \"%d\", arena_result[i]);\n    }\n    printf(\"]\\n\");\n"
        }
    }
}

const PRELUDE: &str = "#include <stdio.h>\n#include <stdlib.h>\n#include <stdbool.h>\n#include <string.h>\n";

const STRING_PRINTER: &str = r#"static void arena_print_string(const char* s) {
    putchar('"');
    for (; *s; s++) {
        unsigned char c = (unsigned char)*s;
        switch (c) {
        case '"': fputs("\\\"", stdout); break;
        case '\\': fputs("\\\\", stdout); break;
        case '\n': fputs("\\n", stdout); break;
        case '\r': fputs("\\r", stdout); break;
        case '\t': fputs("\\t", stdout); break;
        default:
            if (c < 0x20) {
                printf("\\u%04x", c);
            } else {
                putchar(c);
            }
        }
    }
    putchar('"');
}
"#;

impl LanguageAdapter for CAdapter {
    fn language(&self) -> Language {
        Language::C
    }

    fn build_driver(
        &self,
        user_code: &str,
        entry: &EntryPoint,
        case: &TestCase,
    ) -> Result<SourceArtifact, JudgeError> {
        let function = entry_name(entry, Language::C)?;

        let mut locals = String::new();
        let mut call_args = Vec::new();
        for (index, (param, value)) in ordered_arguments(entry, case)?.into_iter().enumerate() {
            let (declaration, passed) = declare(index, param.kind, value);
            locals.push_str(&declaration);
            call_args.extend(passed);
        }
        if entry.returns == ValueKind::IntArray {
            locals.push_str("    int arena_return_size = -1;\n");
            call_args.push("&arena_return_size".to_string());
        }

        let printer = if entry.returns == ValueKind::String {
            STRING_PRINTER
        } else {
            ""
        };

        let contents = format!(
            "{PRELUDE}\n{user_code}\n\n{printer}\nint main(void) {{\n{locals}    {} arena_result = {}({});\n    fflush(stdout);\n{}    return 0;\n}}\n",
            c_type(entry.returns),
            function,
            call_args.join(", "),
            print_result(entry.returns),
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
                .args(["-o", BINARY_FILE])
                .arg(source.to_string_lossy())
                .arg("-lm"),
        )
    }

    fn run_command(&self, workspace: &Workspace, _source: &Path) -> CommandSpec {
        let binary = workspace.path().join(BINARY_FILE);
        CommandSpec::new(binary.to_string_lossy(), workspace.path())
    }
}
