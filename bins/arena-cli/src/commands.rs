// CLI commands for the arena judge
use anyhow::{bail, Context, Result};
use arena_common::catalog::{ChallengeCatalog, JsonCatalog};
use arena_common::config::Config;
use arena_common::types::{Challenge, Language, Submission};
use arena_engine::config::{LanguageConfigManager, ToolCommand};
use arena_engine::{AdapterRegistry, Judge, JudgeLimits, SuiteRun, WorkspaceManager};
use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

fn load_catalog(config: &Config) -> Result<JsonCatalog> {
    JsonCatalog::load(&config.challenges_path).with_context(|| {
        format!(
            "Failed to load challenge catalog from {}",
            config.challenges_path.display()
        )
    })
}

fn find_challenge(catalog: &JsonCatalog, challenge_id: &str) -> Result<Arc<Challenge>> {
    match catalog.challenge(challenge_id) {
        Some(challenge) => Ok(challenge),
        None => bail!(
            "Unknown challenge '{}' (available: {})",
            challenge_id,
            catalog.challenge_ids().join(", ")
        ),
    }
}

fn parse_language(tag: &str) -> Result<Language> {
    match Language::from_str(tag) {
        Some(language) => Ok(language),
        None => bail!("Unsupported language '{}' (expected python, java or c)", tag),
    }
}

/// Judge a local file. Returns whether every test case passed.
pub async fn judge_file(
    config: &Config,
    challenge_id: &str,
    language: &str,
    file: &Path,
    json: bool,
) -> Result<bool> {
    let code = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let catalog = load_catalog(config)?;
    let languages = LanguageConfigManager::load_or_builtin(&config.languages_path)?;

    let judge = Arc::new(Judge::new(
        Arc::new(catalog),
        AdapterRegistry::from_config(&languages),
        WorkspaceManager::new(&config.workspace_root),
        JudgeLimits::from_config(config),
    ));
    let submission = Submission {
        code,
        language: language.to_string(),
        challenge_id: challenge_id.to_string(),
    };

    if !json {
        println!("⚖️  Judging {} ({}) against {}", file.display(), language, challenge_id);
    }

    let run = judge_until(judge, submission, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
    } else {
        print_run(&run);
    }
    Ok(run.report.success)
}

/// Judge on a separate task; when `interrupt` fires first, cancel it and
/// wait until its processes are killed and its workspace is gone.
async fn judge_until(
    judge: Arc<Judge>,
    submission: Submission,
    interrupt: impl Future<Output = ()>,
) -> Result<SuiteRun> {
    let cancel = CancellationToken::new();
    let mut task = tokio::spawn({
        let cancel = cancel.clone();
        async move { judge.judge(&submission, &cancel).await }
    });

    tokio::select! {
        result = &mut task => Ok(result.context("Judge task failed")??),
        _ = interrupt => {
            cancel.cancel();
            let _ = task.await;
            bail!("Interrupted");
        }
    }
}

fn print_run(run: &SuiteRun) {
    println!();
    println!("{:<6} {:<20} {:>8}  {}", "CASE", "VERDICT", "TIME", "DETAIL");
    println!("{}", "─".repeat(72));
    for case in &run.cases {
        let marker = if case.passed() { "✅" } else { "❌" };
        let detail = case
            .message
            .as_deref()
            .and_then(|m| m.lines().next())
            .unwrap_or("");
        println!(
            "{:<6} {} {:<17} {:>6}ms  {}",
            case.index + 1,
            marker,
            case.verdict.as_str(),
            case.elapsed_ms,
            detail
        );
    }
    println!();

    let report = &run.report;
    if report.success {
        println!("✅ Accepted: {}/{} tests passed", report.passed_tests, report.total_tests);
    } else {
        println!("❌ Rejected: {}/{} tests passed", report.passed_tests, report.total_tests);
        if let Some(error) = &report.error {
            println!("\n{}", error);
        }
    }
}

/// List the challenges in the catalog
pub fn list_challenges(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;

    if catalog.is_empty() {
        println!("No challenges in {}.", config.challenges_path.display());
        return Ok(());
    }

    println!("📋 Challenges:\n");
    println!("{:<12} {:<28} {:>6} {:>10}  {}", "ID", "TITLE", "TESTS", "LIMIT", "LANGUAGES");
    println!("{}", "─".repeat(80));

    for id in catalog.challenge_ids() {
        let Some(challenge) = catalog.challenge(&id) else {
            continue;
        };
        let limit = challenge
            .time_limit_ms
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "default".to_string());
        let languages: Vec<&str> = Language::ALL
            .iter()
            .filter(|l| challenge.entry_point.name_for(**l).is_some())
            .map(|l| l.as_str())
            .collect();
        println!(
            "{:<12} {:<28} {:>6} {:>10}  {}",
            challenge.id,
            challenge.title,
            challenge.test_cases.len(),
            limit,
            languages.join(", ")
        );
    }

    println!("\n✅ Total: {} challenge(s)", catalog.len());
    Ok(())
}

/// Print the starter template for one challenge and language
pub fn print_template(config: &Config, challenge_id: &str, language: &str) -> Result<()> {
    let language = parse_language(language)?;
    let catalog = load_catalog(config)?;
    let challenge = find_challenge(&catalog, challenge_id)?;

    match challenge.templates.get(&language) {
        Some(template) => {
            print!("{}", template);
            if !template.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        None => bail!("Challenge '{}' has no {} template", challenge_id, language),
    }
}

fn version_flag(program: &str) -> &'static str {
    // The JDK tools only learned `--version` in Java 9.
    match Path::new(program).file_name().and_then(|n| n.to_str()) {
        Some("java") | Some("javac") => "-version",
        _ => "--version",
    }
}

/// First output line of `<program> <version flag>`, or why it failed.
async fn probe(tool: &ToolCommand) -> Result<String> {
    let output = Command::new(&tool.command)
        .arg(version_flag(&tool.command))
        .output()
        .await
        .with_context(|| format!("{} not found", tool.command))?;

    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    let first_line = text.lines().next().unwrap_or("").trim().to_string();

    if !output.status.success() {
        bail!("{} exited with {}", tool.command, output.status);
    }
    Ok(first_line)
}

/// Check every configured toolchain. Returns whether all were found.
pub async fn check_toolchains(config: &Config) -> Result<bool> {
    let languages = LanguageConfigManager::load_or_builtin(&config.languages_path)?;

    println!("🔧 Toolchains:\n");
    let mut all_found = true;
    for language in languages.list_languages() {
        let Some(lang_config) = languages.get_config(language) else {
            continue;
        };
        let tools = [("compile", &lang_config.compile), ("run", &lang_config.run)];
        for (stage, tool) in tools {
            let Some(tool) = tool else { continue };
            match probe(tool).await {
                Ok(version) => {
                    println!("  ✅ {:<8} {:<8} {:<10} {}", language.as_str(), stage, tool.command, version)
                }
                Err(e) => {
                    all_found = false;
                    println!("  ❌ {:<8} {:<8} {:<10} {:#}", language.as_str(), stage, tool.command, e);
                }
            }
        }
    }

    println!();
    if all_found {
        println!("✅ All toolchains available");
    } else {
        println!("⚠️  Some toolchains are missing - submissions in those languages will fail");
    }
    Ok(all_found)
}
