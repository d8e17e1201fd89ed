//! Language adapters for Python, Java and C.
//!
//! Every driver prints its sentinel on a fresh line, so output the user's
//! code left without a trailing newline cannot swallow the prefix.

pub mod c;
pub mod java;
pub mod python;

pub use c::CAdapter;
pub use java::JavaAdapter;
pub use python::PythonAdapter;

use serde_json::Value;
use std::fmt::Write;

/// Integers of a test case value. Shapes are validated before drivers are
/// built, so anything else renders as zero.
pub(crate) fn int_of(value: &Value) -> i64 {
    value.as_i64().unwrap_or(0)
}

pub(crate) fn ints_of(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .map(|items| items.iter().map(int_of).collect())
        .unwrap_or_default()
}

pub(crate) fn join_ints(values: &[i64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Double-quoted string literal valid in both Java and C source.
///
/// Control characters use three-digit octal escapes: Java would translate a
/// `\u000a` escape into a raw newline before lexing, and C hex escapes
/// swallow any hex digits that follow them.
pub(crate) fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
