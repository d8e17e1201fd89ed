pub mod adapter;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod harness;
pub mod languages;
pub mod registry;
pub mod sentinel;
pub mod workspace;

#[cfg(test)]
mod harness_tests;

pub use adapter::{ExecutionResult, LanguageAdapter, SourceArtifact};
pub use error::JudgeError;
pub use evaluator::{CaseRecord, CaseVerdict};
pub use harness::{Judge, JudgeLimits, SuiteRun};
pub use registry::AdapterRegistry;
pub use workspace::WorkspaceManager;
