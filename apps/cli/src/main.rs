//! tenderlens CLI — question answering over tender document packages.
//!
//! Looks up a tender's extracted documents, selects the passages most
//! relevant to qualification and commercial questions, and asks an LLM.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
