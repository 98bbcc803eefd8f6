//! arxiv-digest CLI: keyword digest of new arXiv papers, posted to Slack.
//!
//! Intended to be triggered once per run by cron or CI.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
