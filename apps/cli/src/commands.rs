//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use arxiv_digest_matcher::FeedClient;
use arxiv_digest_notifier::{NotifyOptions, NotifyOutcome};
use arxiv_digest_shared::{AppConfig, load_config, load_config_from};
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// arxiv-digest: post new arXiv papers matching your keywords to Slack.
#[derive(Parser)]
#[command(
    name = "arxiv-digest",
    version,
    about = "Match the newest arXiv listings against a keyword list and post them to Slack.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to a TOML config file (defaults to ~/.arxiv-digest/arxiv-digest.toml).
    #[arg(long, global = true, env = "ARXIV_DIGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch and match papers, printing the report to stdout.
    Match,

    /// Match papers and post the report to the Slack webhook.
    Notify {
        /// Print the message instead of posting it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show resolved configuration (webhook redacted).
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout
/// carries only command output.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "arxiv_digest=info",
        1 => "arxiv_digest=debug",
        _ => "arxiv_digest=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Match => cmd_match(&config).await,
        Command::Notify { dry_run } => cmd_notify(&config, dry_run).await,
        Command::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

/// Defaults < config file < environment.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    config.apply_env()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_match(config: &AppConfig) -> Result<()> {
    let client = FeedClient::new(config.matcher.timeout_secs)?;
    let report = arxiv_digest_matcher::run(&client, &config.matcher).await?;
    println!("{report}");
    Ok(())
}

async fn cmd_notify(config: &AppConfig, dry_run: bool) -> Result<()> {
    info!(channel = %config.slack.channel, dry_run, "starting notify run");

    match arxiv_digest_notifier::notify(config, NotifyOptions { dry_run }).await? {
        NotifyOutcome::Posted { .. } => println!("Posted to Slack."),
        NotifyOutcome::DryRun { message } => println!("{message}"),
    }
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())?;
    println!("{toml_str}");
    Ok(())
}
