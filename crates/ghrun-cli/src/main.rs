//! ghrun CLI tool.

use anyhow::Context;
use clap::{Parser, Subcommand};
use ghrun_config::load_settings;
use ghrun_core::RepoRef;
use ghrun_github::{DEFAULT_API_URL, GitHubClient};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod table;

use commands::runs::ListOptions;

#[derive(Parser)]
#[command(name = "ghrun")]
#[command(about = "List CI workflow runs", long_about = None)]
struct Cli {
    /// API server URL
    #[arg(long, global = true, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Access token
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "GHRUN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Work with workflow runs
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
}

#[derive(Subcommand)]
enum RunCommands {
    /// List recent workflow runs
    List {
        /// Maximum number of runs to fetch
        #[arg(short = 'L', long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,
        /// Always print tab-separated output
        #[arg(long)]
        plain: bool,
        /// Repository in OWNER/REPO form
        #[arg(short = 'R', long, env = "GH_REPO", value_parser = RepoRef::from_full_name)]
        repo: Option<RepoRef>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref()).context("Failed to load config")?;

    let api_url = cli
        .api_url
        .or_else(|| settings.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let token = cli.token.or_else(|| settings.token.clone());

    match cli.command {
        Commands::Run { command } => match command {
            RunCommands::List { limit, plain, repo } => {
                let opts = ListOptions::resolve(limit, plain, repo, &settings)?;
                let client = GitHubClient::new(&api_url, token)?;

                let stdout = std::io::stdout();
                let is_terminal = stdout.is_terminal();
                commands::runs::list(&client, &opts, is_terminal, &mut stdout.lock()).await?;
            }
        },
    }

    Ok(())
}
