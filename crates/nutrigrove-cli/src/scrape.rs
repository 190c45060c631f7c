//! The `scrape` command: scrape every selected site in parallel, then write
//! cleaned artifacts and upload them.
//!
//! Per-meal and per-site failures are logged and reported in the summary
//! rather than propagated, so one broken site does not abort the run.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use nutrigrove_core::{AppConfig, MealType, NutrientRecord, SiteConfig, WeekendPolicy};
use nutrigrove_scraper::{BrowserSession, MealScrape, MenuScraper, Pacing, SessionOptions, SiteProfile};
use nutrigrove_sink::{ArtifactWriter, RecordSink, SinkOptions, SupabaseSink};

use crate::summary::{
    MealOutcome, MealStatus, ProcessingOutcome, ProcessingReport, RunSummary, ScrapeOutcome,
    SiteScrapeReport, UploadStatus,
};

/// Resolved arguments of one `scrape` invocation.
#[derive(Debug, Clone)]
pub(crate) struct ScrapeArgs {
    pub date: NaiveDate,
    pub sites: Vec<String>,
    pub workers: usize,
    pub output: PathBuf,
    pub weekend_policy: WeekendPolicy,
    pub upload: bool,
}

/// Everything one site worker produced.
#[derive(Debug)]
pub(crate) struct SiteRun {
    pub key: String,
    pub table: String,
    pub report: SiteScrapeReport,
    pub scrapes: Vec<MealScrape>,
}

pub(crate) async fn run_scrape(config: &AppConfig, args: ScrapeArgs) -> anyhow::Result<ExitCode> {
    let started = Instant::now();

    let sites_file = nutrigrove_core::load_sites(&config.sites_path)
        .with_context(|| format!("loading sites from {}", config.sites_path.display()))?;
    let sites = sites_file.select(&args.sites)?;
    if sites.is_empty() {
        anyhow::bail!("no sites configured in {}", config.sites_path.display());
    }

    let meals = args.weekend_policy.meals_for(args.date);
    let writer = ArtifactWriter::new(&args.output);
    let workers = args.workers.max(1);

    tracing::info!(
        date = %args.date,
        sites = sites.len(),
        workers,
        weekend_policy = %args.weekend_policy,
        output = %args.output.display(),
        "starting scrape run"
    );

    let mut runs: Vec<(usize, SiteRun)> = stream::iter(sites.iter().copied().enumerate())
        .map(|(order, site)| {
            let fut = scrape_site(config, site, args.date, &meals, &writer);
            async move { (order, fut.await) }
        })
        .buffer_unordered(workers)
        .collect()
        .await;
    runs.sort_by_key(|(order, _)| *order);
    let runs: Vec<SiteRun> = runs.into_iter().map(|(_, run)| run).collect();

    let sink = build_sink(config, args.upload)?;

    let processing: Vec<ProcessingReport> = stream::iter(&runs)
        .map(|run| {
            let writer = &writer;
            let sink = sink.as_ref();
            async move {
                let table_sink = match sink.map(|s| s.for_table(&run.table)).transpose() {
                    Ok(table_sink) => table_sink,
                    Err(e) => {
                        return ProcessingReport {
                            key: run.key.clone(),
                            outcome: ProcessingOutcome::Failed(e.to_string()),
                        }
                    }
                };
                process_site(run, writer, table_sink.as_ref()).await
            }
        })
        .buffered(workers)
        .collect()
        .await;

    let summary = RunSummary {
        date: args.date,
        elapsed: started.elapsed(),
        scraping: runs.into_iter().map(|run| run.report).collect(),
        processing,
    };
    println!("{summary}");

    if summary.succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!(
            scraped = summary.successful_scrapes(),
            processed = summary.successful_processing(),
            total = summary.scraping.len(),
            "some sites failed"
        );
        Ok(ExitCode::FAILURE)
    }
}

fn build_sink(config: &AppConfig, upload: bool) -> anyhow::Result<Option<SupabaseSink>> {
    if !upload {
        tracing::info!("upload disabled by --no-upload");
        return Ok(None);
    }
    let Some(credentials) = config.supabase.as_ref() else {
        tracing::warn!("SUPABASE_URL or SUPABASE_ANON_KEY not set; upload disabled");
        return Ok(None);
    };
    // Sites upload through `for_table`; this table is only the default.
    let sink = SupabaseSink::new(credentials, "cleaned_data", SinkOptions::from(config))
        .context("building Supabase sink")?;
    Ok(Some(sink))
}

pub(crate) fn session_options(config: &AppConfig, site: &SiteConfig) -> SessionOptions {
    SessionOptions {
        headless: config.headless,
        chrome_path: config.chrome_path.clone(),
        stealth: site.stealth,
        navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
        settle: Duration::from_secs(config.page_settle_secs),
    }
}

/// One site worker: a browser session of its own, every meal in order, and
/// the session closed before returning.
async fn scrape_site(
    config: &AppConfig,
    site: &SiteConfig,
    date: NaiveDate,
    meals: &[MealType],
    writer: &ArtifactWriter,
) -> SiteRun {
    let mut run = SiteRun {
        key: site.key.clone(),
        table: site.table.clone(),
        report: SiteScrapeReport {
            key: site.key.clone(),
            outcome: ScrapeOutcome::ApiBased,
        },
        scrapes: Vec::new(),
    };

    if site.api_based {
        tracing::info!(site = %site.key, "api-based site; ingestion runs elsewhere, skipping");
        return run;
    }

    let mut session = match BrowserSession::open(&session_options(config, site)).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(site = %site.key, error = %e, "could not start browser session");
            run.report.outcome = ScrapeOutcome::SessionFailed(e.to_string());
            return run;
        }
    };
    tracing::debug!(site = %site.key, user_agent = session.user_agent(), "site worker started");

    let scraper = MenuScraper::new(
        SiteProfile::from(site),
        Pacing::default().with_popup_wait(Duration::from_secs(config.popup_timeout_secs)),
        Duration::from_secs(config.challenge_timeout_secs),
    );

    let mut outcomes = Vec::with_capacity(meals.len());
    for &meal in meals {
        let url = site.build_url(date, meal);
        let status = match scraper.scrape_meal(&session, meal, &url).await {
            Ok(scrape) => {
                let status = record_meal(site, &scrape, writer);
                run.scrapes.push(scrape);
                status
            }
            Err(e) => {
                tracing::error!(site = %site.key, meal = %meal, error = %e, "meal failed");
                MealStatus::Failed(e.to_string())
            }
        };
        outcomes.push(MealOutcome { meal, status });
    }

    session.close().await;
    run.report.outcome = ScrapeOutcome::Meals(outcomes);
    run
}

/// Persist a meal's raw items and classify the result.
fn record_meal(site: &SiteConfig, scrape: &MealScrape, writer: &ArtifactWriter) -> MealStatus {
    if let Err(e) = writer.write_raw(&site.key, scrape.meal, &scrape.raw_items) {
        tracing::error!(site = %site.key, meal = %scrape.meal, error = %e, "could not save raw items");
        return MealStatus::Failed(e.to_string());
    }
    if scrape.is_empty() {
        MealStatus::NoItems {
            sections: scrape.sections_found,
        }
    } else {
        MealStatus::Scraped {
            items: scrape.raw_items.len(),
            sections: scrape.sections_found,
        }
    }
}

/// Write cleaned artifacts for one site and upload its records when a sink
/// is configured.
pub(crate) async fn process_site<S: RecordSink>(
    run: &SiteRun,
    writer: &ArtifactWriter,
    sink: Option<&S>,
) -> ProcessingReport {
    let outcome = match &run.report.outcome {
        ScrapeOutcome::ApiBased => ProcessingOutcome::ApiBased,
        ScrapeOutcome::SessionFailed(_) => {
            ProcessingOutcome::Failed("nothing was scraped".to_string())
        }
        ScrapeOutcome::Meals(_) => match write_cleaned(run, writer) {
            Ok(records) if records.is_empty() => {
                tracing::warn!(site = %run.key, "no records to process");
                ProcessingOutcome::Failed("no records to process".to_string())
            }
            Ok(records) => {
                let upload = match sink {
                    Some(sink) => upload(&run.key, sink, &records).await,
                    None => UploadStatus::Disabled,
                };
                ProcessingOutcome::Processed {
                    records: records.len(),
                    upload,
                }
            }
            Err(e) => {
                tracing::error!(site = %run.key, error = %e, "could not write cleaned artifacts");
                ProcessingOutcome::Failed(e.to_string())
            }
        },
    };
    ProcessingReport {
        key: run.key.clone(),
        outcome,
    }
}

fn write_cleaned(
    run: &SiteRun,
    writer: &ArtifactWriter,
) -> Result<Vec<NutrientRecord>, nutrigrove_sink::SinkError> {
    let mut all = Vec::new();
    for scrape in &run.scrapes {
        writer.write_cleaned(&run.key, scrape.meal, &scrape.records)?;
        all.extend(scrape.records.iter().cloned());
    }
    if !all.is_empty() {
        writer.write_combined(&run.key, &all)?;
    }
    Ok(all)
}

async fn upload<S: RecordSink>(key: &str, sink: &S, records: &[NutrientRecord]) -> UploadStatus {
    tracing::info!(site = %key, records = records.len(), "uploading records");
    let report = sink.insert_batch(records).await;
    if !report.is_clean() {
        tracing::warn!(
            site = %key,
            inserted = report.inserted_ids.len(),
            failed = report.failures.len(),
            "some records were rejected"
        );
    }
    UploadStatus::Uploaded {
        inserted: report.inserted_ids.len(),
        failed: report.failures.len(),
    }
}

#[cfg(test)]
#[path = "scrape_test.rs"]
mod tests;
