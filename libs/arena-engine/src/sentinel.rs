/// Sentinel Decoder - Structured Results From Raw Output
///
/// Drivers report through stdout with one line of a fixed grammar:
///
/// ```text
/// RESULT:<json literal>     entry point returned a value
/// ERROR:<message>           entry point raised / failed in user code
/// ```
///
/// The prefix must start the line. The RESULT payload must be one complete
/// JSON value of the challenge's return shape; anything else is a parse
/// error, never a partial match. When several sentinel lines are present
/// the last one counts, since the driver always prints after user code.
use arena_common::types::ValueKind;
use nix::sys::signal::Signal;
use serde_json::Value;

use crate::adapter::ExecutionResult;
use crate::executor::ProcessOutput;

pub const RESULT_PREFIX: &str = "RESULT:";
pub const ERROR_PREFIX: &str = "ERROR:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel<'a> {
    Result(&'a str),
    Error(&'a str),
}

/// Last sentinel line in `stdout`, if any.
pub fn find_sentinel(stdout: &str) -> Option<Sentinel<'_>> {
    stdout.lines().rev().find_map(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(payload) = line.strip_prefix(RESULT_PREFIX) {
            Some(Sentinel::Result(payload))
        } else {
            line.strip_prefix(ERROR_PREFIX).map(Sentinel::Error)
        }
    })
}

/// Parse a RESULT payload and check it against the expected shape.
pub fn parse_payload(payload: &str, returns: ValueKind) -> Result<Value, String> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| format!("'{}' is not a valid literal ({})", payload, e))?;
    if !returns.matches(&value) {
        return Err(format!("expected {}, got {}", returns.describe(), value));
    }
    Ok(value)
}

/// Turn a finished process into an execution result.
pub fn decode(output: &ProcessOutput, returns: ValueKind) -> ExecutionResult {
    match find_sentinel(&output.stdout) {
        Some(Sentinel::Result(payload)) => match parse_payload(payload, returns) {
            Ok(value) => ExecutionResult::Success(value),
            Err(reason) => ExecutionResult::ParseError(reason),
        },
        Some(Sentinel::Error(message)) => {
            let message = message.trim();
            ExecutionResult::RuntimeError(if message.is_empty() {
                "Runtime error".to_string()
            } else {
                message.to_string()
            })
        }
        None if output.success() => ExecutionResult::RuntimeError("No valid result found".to_string()),
        None => ExecutionResult::RuntimeError(crash_message(output)),
    }
}

fn crash_message(output: &ProcessOutput) -> String {
    if !output.stderr.trim().is_empty() {
        return output.stderr.trim().to_string();
    }
    if !output.stdout.trim().is_empty() {
        return output.stdout.trim().to_string();
    }
    match output.signal {
        Some(signal) => match Signal::try_from(signal) {
            Ok(name) => format!("Process terminated by signal {} ({})", signal, name),
            Err(_) => format!("Process terminated by signal {}", signal),
        },
        None => "Runtime error".to_string(),
    }
}
