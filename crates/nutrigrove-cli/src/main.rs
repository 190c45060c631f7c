mod clean;
mod scrape;
mod summary;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use nutrigrove_core::{AppConfig, MealType, WeekendPolicy};
use tracing_subscriber::EnvFilter;

use crate::scrape::ScrapeArgs;

#[derive(Debug, Parser)]
#[command(name = "nutrigrove-cli")]
#[command(about = "Dining hall menu and nutrition scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape menus for a date, write JSON artifacts, and upload records
    Scrape {
        /// Menu date as YYYY-MM-DD (defaults to today)
        date: Option<NaiveDate>,

        /// Restrict the run to these site keys (repeatable)
        #[arg(long = "site")]
        sites: Vec<String>,

        /// Number of sites scraped concurrently
        #[arg(long)]
        workers: Option<usize>,

        /// Root directory for scraped/ and cleaned/ artifacts
        #[arg(long)]
        output: Option<PathBuf>,

        /// Which meals to scrape on Saturday and Sunday
        #[arg(long)]
        weekend_policy: Option<WeekendPolicy>,

        /// Write artifacts only; skip the database upload
        #[arg(long)]
        no_upload: bool,
    },
    /// Re-run nutrition normalization over a saved raw-item file
    Normalize {
        /// A scraped food_items_<meal>.json file
        #[arg(long)]
        input: PathBuf,

        /// Meal the items belong to (inferred from the file name when omitted)
        #[arg(long)]
        meal: Option<MealType>,
    },
    /// List configured sites and today's menu URLs
    Sites,
}

impl Commands {
    fn into_scrape_args(self, config: &AppConfig, today: NaiveDate) -> Option<ScrapeArgs> {
        match self {
            Commands::Scrape {
                date,
                sites,
                workers,
                output,
                weekend_policy,
                no_upload,
            } => Some(ScrapeArgs {
                date: date.unwrap_or(today),
                sites,
                workers: workers.unwrap_or(config.max_workers),
                output: output.unwrap_or_else(|| config.output_dir.clone()),
                weekend_policy: weekend_policy.unwrap_or(config.weekend_policy),
                upload: !no_upload,
            }),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "fatal error");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = nutrigrove_core::load_app_config().context("loading configuration")?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))
        .context("building log filter")?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let today = chrono::Local::now().date_naive();
    match cli.command {
        Commands::Normalize { input, meal } => {
            clean::run_normalize(&input, meal)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Sites => {
            list_sites(&config, today)?;
            Ok(ExitCode::SUCCESS)
        }
        command @ Commands::Scrape { .. } => {
            let args = command
                .into_scrape_args(&config, today)
                .context("scrape arguments")?;
            scrape::run_scrape(&config, args).await
        }
    }
}

fn list_sites(config: &AppConfig, today: NaiveDate) -> anyhow::Result<()> {
    let sites = nutrigrove_core::load_sites(&config.sites_path)
        .with_context(|| format!("loading sites from {}", config.sites_path.display()))?;
    for site in &sites.sites {
        println!("{} ({}) -> table {}", site.key, site.name, site.table);
        if site.api_based {
            println!("  api-based: {}", site.url_template);
            continue;
        }
        for meal in config.weekend_policy.meals_for(today) {
            println!("  {:<9} {}", meal.as_str(), site.build_url(today, meal));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
