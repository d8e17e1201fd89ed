// Service configuration, read from the environment

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_LANGUAGES_CONFIG: &str = "config/languages.json";
pub const DEFAULT_CHALLENGES_CONFIG: &str = "config/challenges.json";
pub const DEFAULT_RUN_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_COMPILE_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
#[error("invalid value for {key}: '{value}'")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Parent directory of every per-attempt workspace.
    pub workspace_root: PathBuf,
    pub languages_path: PathBuf,
    pub challenges_path: PathBuf,
    pub run_timeout_ms: u64,
    pub compile_timeout_ms: u64,
    pub max_source_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            workspace_root: env::temp_dir().join("arena-judge"),
            languages_path: PathBuf::from(DEFAULT_LANGUAGES_CONFIG),
            challenges_path: PathBuf::from(DEFAULT_CHALLENGES_CONFIG),
            run_timeout_ms: DEFAULT_RUN_TIMEOUT_MS,
            compile_timeout_ms: DEFAULT_COMPILE_TIMEOUT_MS,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            bind_addr: lookup("ARENA_BIND_ADDR").unwrap_or(defaults.bind_addr),
            workspace_root: lookup("ARENA_WORKSPACE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.workspace_root),
            languages_path: lookup("ARENA_LANGUAGES_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.languages_path),
            challenges_path: lookup("ARENA_CHALLENGES_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.challenges_path),
            run_timeout_ms: parsed(&lookup, "ARENA_RUN_TIMEOUT_MS", defaults.run_timeout_ms)?,
            compile_timeout_ms: parsed(
                &lookup,
                "ARENA_COMPILE_TIMEOUT_MS",
                defaults.compile_timeout_ms,
            )?,
            max_source_bytes: parsed(&lookup, "ARENA_MAX_SOURCE_BYTES", defaults.max_source_bytes)?,
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError { key, value }),
        None => Ok(default),
    }
}
