//! novelfetch CLI: crawl a web novel chapter by chapter into one text file.
//!
//! Follows "next chapter" links from a starting URL, extracts and cleans
//! each chapter's text, and joins the chapters into a single document.

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
