mod echo;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use url::Url;
use zenn_migrate_core::fetch::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use zenn_migrate_core::migrate::DEFAULT_OUTPUT_DIR;
use zenn_migrate_core::{ClientConfig, MigrateConfig, Migrator};

use crate::echo::{print_banner, print_error, print_info, print_step, print_summary};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_USERNAME: &str = "tktcorporation";

/// Export every article of a Zenn account to Markdown files with front matter
#[derive(Parser, Debug)]
#[command(name = "zenn-migrate")]
#[command(version)]
#[command(about = "Migrate Zenn articles to local Markdown files", long_about = None)]
struct Args {
    /// Zenn username whose articles are migrated
    #[arg(value_name = "USERNAME", default_value = DEFAULT_USERNAME)]
    username: String,

    /// Directory the articles are written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR, value_name = "DIR")]
    output_dir: PathBuf,

    /// Migrate only this slug instead of listing the account (repeatable)
    #[arg(long, value_name = "SLUG")]
    slug: Vec<String>,

    /// Pause between articles in seconds
    #[arg(long, default_value = "2", value_name = "SECS")]
    delay: u64,

    /// HTTP timeout in seconds (default: no timeout)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Base URL of the Zenn site
    #[arg(long, default_value = DEFAULT_BASE_URL, value_name = "URL")]
    base_url: Url,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = format!("zenn_migrate_core={level},zenn_migrate={level},warn");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    print_banner();
    print_info(&format!("Starting migration for user: {}", args.username.bright_white()));

    let client = ClientConfig {
        base_url: args.base_url,
        timeout: args.timeout,
        user_agent: args.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        ..Default::default()
    };
    let config = MigrateConfig::builder()
        .output_dir(args.output_dir)
        .delay(Duration::from_secs(args.delay))
        .build();

    let migrator = Migrator::from_config(client, config).context("Failed to set up HTTP client")?;
    migrator.store().ensure_dir().with_context(|| {
        format!("Failed to create output directory: {}", migrator.store().dir().display())
    })?;

    let slugs = if args.slug.is_empty() {
        print_step(1, 2, "Listing articles");
        migrator
            .list(&args.username)
            .await
            .with_context(|| format!("Failed to list articles for {}", args.username))?
    } else {
        print_step(1, 2, "Using slugs from the command line");
        args.slug
    };
    eprintln!("\n  {} {}\n", "Articles:".dimmed(), slugs.len().to_string().bright_white());

    print_step(2, 2, "Fetching and writing articles");
    let summary = migrator
        .migrate_slugs(&args.username, &slugs)
        .await
        .context("Failed to write article")?;

    print_summary(&summary, migrator.store().dir());
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        print_error(&format!("Migration failed: {:#}", e));
        std::process::exit(1);
    }
}
