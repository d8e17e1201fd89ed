// Toolchain configuration for the judge engine
use anyhow::{bail, Context, Result};
use arena_common::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// A program plus the flags that always go before the adapter's own
/// arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(command: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: Language,
    #[serde(default)]
    pub version: Option<String>,
    /// Compiler, for languages with a build step.
    #[serde(default)]
    pub compile: Option<ToolCommand>,
    /// Interpreter or VM. Absent for languages that run a native binary.
    #[serde(default)]
    pub run: Option<ToolCommand>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageConfig>,
}

/// Language toolchain table
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<Language, LanguageConfig>,
}

impl LanguageConfigManager {
    /// Load language configurations from languages.json
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let languages_json: LanguagesJson = serde_json::from_str(content)?;

        let mut configs = HashMap::new();
        for lang in languages_json.languages {
            if configs.contains_key(&lang.name) {
                bail!("Duplicate configuration for language: {}", lang.name);
            }
            configs.insert(lang.name, lang);
        }

        Ok(Self { configs })
    }

    /// Load `config_path`, or fall back to the built-in toolchains when the
    /// file does not exist. A file that exists but is broken is an error.
    pub fn load_or_builtin(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let manager = Self::load(config_path)?;
            info!(
                path = %config_path.display(),
                languages = ?manager.list_languages(),
                "Loaded language toolchains"
            );
            Ok(manager)
        } else {
            warn!(
                path = %config_path.display(),
                "Language config not found - using built-in toolchains"
            );
            Ok(Self::builtin())
        }
    }

    /// `python3`, `javac`/`java` and `gcc` from PATH.
    pub fn builtin() -> Self {
        let configs = [
            LanguageConfig {
                name: Language::Python,
                version: None,
                compile: None,
                run: Some(ToolCommand::new("python3", ["-B"])),
            },
            LanguageConfig {
                name: Language::Java,
                version: None,
                compile: Some(ToolCommand::new("javac", ["-encoding", "UTF-8"])),
                run: Some(ToolCommand::new("java", ["-Xss64m"])),
            },
            LanguageConfig {
                name: Language::C,
                version: None,
                compile: Some(ToolCommand::new("gcc", ["-O2", "-std=gnu11"])),
                run: None,
            },
        ];
        Self {
            configs: configs.into_iter().map(|c| (c.name, c)).collect(),
        }
    }

    /// Get configuration for a specific language
    pub fn get_config(&self, language: Language) -> Option<&LanguageConfig> {
        self.configs.get(&language)
    }

    /// List all configured languages
    pub fn list_languages(&self) -> Vec<Language> {
        let mut languages: Vec<Language> = self.configs.keys().copied().collect();
        languages.sort_by_key(|l| l.as_str());
        languages
    }
}
