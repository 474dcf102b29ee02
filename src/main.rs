use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    worm_scraper::logging::init().context("init logging")?;

    let cli = worm_scraper::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = worm_scraper::config::ScrapeConfig::from_cli(&cli);
    tracing::info!("starting to scrape {}", config.book.title);
    let summary = worm_scraper::build::run(config).await.context("scrape")?;
    tracing::info!(
        arcs = summary.arcs,
        chapters = summary.chapters,
        dropped = summary.dropped,
        unavailable = summary.unavailable,
        "done"
    );

    Ok(())
}
