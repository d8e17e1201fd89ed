mod commands;

use anyhow::{Context, Result};
use arena_common::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arena-cli")]
#[command(about = "Arena CLI - Judge solutions locally and inspect challenges", long_about = None)]
struct Cli {
    /// Challenge catalog (defaults to ARENA_CHALLENGES_CONFIG or config/challenges.json)
    #[arg(long, global = true)]
    challenges: Option<PathBuf>,

    /// Toolchain table (defaults to ARENA_LANGUAGES_CONFIG or config/languages.json)
    #[arg(long, global = true)]
    languages: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge a source file against a challenge's test suite
    Judge {
        /// Challenge id (e.g., easy-1)
        #[arg(short, long)]
        challenge: String,

        /// Language tag (python, java, c)
        #[arg(short, long)]
        language: String,

        /// Source file to judge
        #[arg(short, long)]
        file: PathBuf,

        /// Print the JSON report instead of the per-case table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List the challenges in the catalog
    Challenges,

    /// Print the starter template for a challenge
    Template {
        /// Challenge id
        #[arg(short, long)]
        challenge: String,

        /// Language tag
        #[arg(short, long)]
        language: String,
    },

    /// Check that every configured toolchain is installed
    Toolchains,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("Invalid environment configuration")?;
    if let Some(path) = cli.challenges {
        config.challenges_path = path;
    }
    if let Some(path) = cli.languages {
        config.languages_path = path;
    }

    match cli.command {
        Commands::Judge {
            challenge,
            language,
            file,
            json,
        } => {
            let passed = commands::judge_file(&config, &challenge, &language, &file, json).await?;
            if !passed {
                std::process::exit(1);
            }
        }
        Commands::Challenges => {
            commands::list_challenges(&config)?;
        }
        Commands::Template {
            challenge,
            language,
        } => {
            commands::print_template(&config, &challenge, &language)?;
        }
        Commands::Toolchains => {
            let all_found = commands::check_toolchains(&config).await?;
            if !all_found {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
