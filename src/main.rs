//! fleetdex CLI
//!
//! One sequential pass per invocation: discover hosts, rebuild the index if
//! it is stale, search it, let the operator pick a host, and hand off to ssh.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use fleetdex::config::AppConfig;
use fleetdex::search::{FreshnessGate, HostIndex, QueryError, UpsertOutcome};
use fleetdex::{discovery, picker};

#[derive(Parser)]
#[command(
    name = "fleetdex",
    version,
    about = "Fuzzy-search your cloud inventory and ssh into the pick"
)]
struct Cli {
    /// Free-text search query; prompts interactively when omitted
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = AppConfig::default_path()?;
    if !config_path.exists() {
        println!(
            "Please create a configuration file at {}.\nSee the config.toml section of the README for reference.",
            config_path.display()
        );
        return Ok(());
    }

    let config = AppConfig::load(&config_path)?;
    AppConfig::ensure_dirs()?;
    init_logging(&config)?;

    let sources = discovery::sources_from_config(&config)?;
    let records = discovery::discover_all(
        &sources,
        Duration::from_secs(config.discovery_timeout_secs),
    )
    .await?;

    let gate = FreshnessGate::new(config.state_file()?, config.ttl);
    let index = HostIndex::open(&config.index_dir()?)?;
    match index.upsert(&gate, &records)? {
        UpsertOutcome::Indexed { count } => {
            tracing::info!(count, total = index.doc_count(), "index refreshed");
        }
        UpsertOutcome::Fresh => {}
    }

    let term = if cli.query.is_empty() {
        picker::prompt_for_term()
    } else {
        cli.query.join(" ")
    };
    let term = term.trim();
    if term.is_empty() {
        return Ok(());
    }

    let hosts = match index.search(term) {
        Ok(hosts) => hosts,
        Err(QueryError::Parse(err)) => {
            tracing::warn!(query = %term, error = %err, "query did not parse");
            println!("No matches for '{term}'.");
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    if hosts.is_empty() {
        println!("No matches for '{term}'.");
        return Ok(());
    }

    let lines: Vec<String> = hosts.iter().map(picker::display_line).collect();
    let Some(choice) = picker::pick(&lines)? else {
        return Ok(());
    };
    let Some(address) = lines.get(choice).and_then(|line| picker::chosen_address(line)) else {
        return Ok(());
    };

    let status = picker::connect(address)
        .await
        .with_context(|| format!("failed to launch ssh for {address}"))?;
    tracing::info!(%address, code = status.code(), "ssh session ended");

    Ok(())
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.log_path()? {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
