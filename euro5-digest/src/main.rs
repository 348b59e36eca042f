//! euro5-digest - command-line reader for the weekly European news digest
//!
//! Loads the feeds once, prints the digest, the changelog or just the week
//! label, and exits non-zero when a required feed could not be loaded.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use euro5_common::config::{CliOverrides, ConfigResolver, DigestConfig};
use euro5_common::i18n::translate;
use euro5_digest::changelog::load_changelog;
use euro5_digest::render::{render_changelog, render_digest, week_badge};
use euro5_digest::{CategoryFilter, DigestLoader, DigestView, LoadError};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "euro5-digest")]
#[command(about = "Weekly European news digest reader")]
#[command(version)]
struct Args {
    /// Configuration file (default: $EURO5_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL the feed paths are resolved against
    #[arg(long)]
    base_url: Option<String>,

    /// Interface language (en, nb, nn, da, sv)
    #[arg(short, long)]
    locale: Option<String>,

    /// Per-feed fetch timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Top picks, regional picks and one page of stories
    Digest {
        /// Case-insensitive search over titles and excerpts
        #[arg(short, long)]
        search: Option<String>,

        /// Category to show ("all" for every category)
        #[arg(long)]
        category: Option<String>,

        /// Page number, 1-based
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Development changelog
    Changelog,
    /// Current ISO week label only
    Week,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting euro5-digest v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let overrides = CliOverrides {
        config_path: args.config.clone(),
        base_url: args.base_url.clone(),
        timeout_ms: args.timeout_ms,
        locale: args.locale.clone(),
    };
    let config = ConfigResolver::new(overrides)
        .resolve()
        .context("Failed to resolve configuration")?;
    info!(base_url = %config.base_url, locale = %config.locale, "Configuration resolved");

    let command = args.command.unwrap_or(Command::Digest {
        search: None,
        category: None,
        page: 1,
    });

    match command {
        Command::Changelog => run_changelog(&config, args.json).await,
        Command::Week => run_week(&config, args.json).await,
        Command::Digest {
            search,
            category,
            page,
        } => run_digest(&config, args.json, search, category, page).await,
    }
}

/// Load with Ctrl-C tearing the session down
async fn load_session(loader: &DigestLoader) -> Option<Result<euro5_digest::Digest, LoadError>> {
    let guard = CancellationToken::new();
    let ctrl_c = guard.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });
    loader.load_guarded(&guard).await
}

async fn run_digest(
    config: &DigestConfig,
    json: bool,
    search: Option<String>,
    category: Option<String>,
    page: usize,
) -> Result<ExitCode> {
    let loader = DigestLoader::from_config(config)?;
    let Some(result) = load_session(&loader).await else {
        return Ok(ExitCode::from(130));
    };

    let mut view = DigestView::new(config.stories_per_page);
    view.apply(result);
    if let Some(search) = search {
        view.set_search(search);
    }
    if let Some(category) = category {
        view.select_category(CategoryFilter::parse(&category));
    }
    view.jump_to(page);

    if let Some(message) = view.error_message(config.locale) {
        return Ok(report_failure(config, "errors.loadDataTitle", &message));
    }

    if json {
        if let Some(digest) = view.digest() {
            println!("{}", serde_json::to_string_pretty(digest)?);
        }
    } else {
        print!("{}", render_digest(&view, config.locale)?);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_changelog(config: &DigestConfig, json: bool) -> Result<ExitCode> {
    let loader = DigestLoader::from_config(config)?;
    match load_changelog(loader.fetcher(), &config.changelog_url()).await {
        Ok(entries) if json => println!("{}", serde_json::to_string_pretty(&entries)?),
        Ok(entries) => print!("{}", render_changelog(&entries, config.locale)?),
        Err(e) => return Ok(report_failure(config, "devPage.errorTitle", &e.to_string())),
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_week(config: &DigestConfig, json: bool) -> Result<ExitCode> {
    let loader = DigestLoader::from_config(config)?;
    let Some(result) = load_session(&loader).await else {
        return Ok(ExitCode::from(130));
    };
    match result {
        Ok(digest) if json => println!("{}", serde_json::json!({ "week": digest.week_number })),
        Ok(digest) => println!("{}", week_badge(config.locale, &digest.week_number)),
        Err(e) => {
            let message = e
                .user_message()
                .unwrap_or_else(|| translate(config.locale, "errors.unknownCsv", &[]));
            return Ok(report_failure(config, "errors.loadDataTitle", &message));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn report_failure(config: &DigestConfig, title_key: &str, message: &str) -> ExitCode {
    error!("{}", message);
    eprintln!("{}", translate(config.locale, title_key, &[]));
    eprintln!("{}", message);
    ExitCode::FAILURE
}
