mod collect;
mod exposition;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use htmlexp_core::{AppConfig, ScrapeRequest};
use htmlexp_scraper::{Scraper, ScraperOptions};

#[derive(Debug, Parser)]
#[command(name = "htmlexp-cli")]
#[command(about = "Scrape numeric values out of HTML pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape a single page and print the value
    Scrape {
        /// Page to fetch
        url: String,

        /// XPath expression selecting the value
        #[arg(long, short)]
        selector: String,

        /// Render the page in headless Chromium before selecting
        #[arg(long)]
        headless: bool,

        #[arg(long, default_value = ",")]
        thousands_separator: String,

        #[arg(long, default_value = ".")]
        decimal_separator: String,

        /// Read this attribute of the matched element instead of its text
        #[arg(long)]
        attribute: Option<String>,
    },
    /// Scrape every configured target and print gauge samples
    Collect {
        /// Targets file (defaults to HTMLEXP_TARGETS_PATH)
        #[arg(long)]
        targets: Option<PathBuf>,

        /// Restrict collection to a single target (by name)
        #[arg(long)]
        target: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = htmlexp_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tokio::select! {
        result = run(cli.command, &config) => result,
        () = shutdown_signal() => {
            tracing::info!("received shutdown signal, abandoning in-flight scrapes");
            Ok(())
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Scrape {
            url,
            selector,
            headless,
            thousands_separator,
            decimal_separator,
            attribute,
        } => {
            let mut request = ScrapeRequest::new(url, selector)
                .with_separators(thousands_separator, decimal_separator)
                .with_headless(headless);
            request.attribute = attribute;

            let scraper = Scraper::new(ScraperOptions::from_app_config(config))?;
            let value = scraper.scrape(&request).await?;
            println!("{value}");
            Ok(())
        }
        Commands::Collect { targets, target } => {
            let path = targets.unwrap_or_else(|| config.targets_path.clone());
            collect::run_collect(config, &path, target.as_deref()).await
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
