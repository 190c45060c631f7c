//! Per-site outcomes of a run and the report printed at the end.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use nutrigrove_core::MealType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MealStatus {
    Scraped { items: usize, sections: usize },
    NoItems { sections: usize },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MealOutcome {
    pub meal: MealType,
    pub status: MealStatus,
}

impl MealOutcome {
    pub(crate) fn succeeded(&self) -> bool {
        matches!(self.status, MealStatus::Scraped { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScrapeOutcome {
    /// Structured-data sites are ingested elsewhere.
    ApiBased,
    /// The browser could not be started.
    SessionFailed(String),
    Meals(Vec<MealOutcome>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SiteScrapeReport {
    pub key: String,
    pub outcome: ScrapeOutcome,
}

impl SiteScrapeReport {
    /// Every attempted meal produced at least one item.
    pub(crate) fn succeeded(&self) -> bool {
        match &self.outcome {
            ScrapeOutcome::ApiBased => true,
            ScrapeOutcome::SessionFailed(_) => false,
            ScrapeOutcome::Meals(meals) => meals.iter().all(MealOutcome::succeeded),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UploadStatus {
    Disabled,
    Uploaded { inserted: usize, failed: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProcessingOutcome {
    ApiBased,
    Processed { records: usize, upload: UploadStatus },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProcessingReport {
    pub key: String,
    pub outcome: ProcessingOutcome,
}

impl ProcessingReport {
    pub(crate) fn succeeded(&self) -> bool {
        match self.outcome {
            ProcessingOutcome::ApiBased => true,
            ProcessingOutcome::Processed { upload, .. } => match upload {
                UploadStatus::Disabled => true,
                UploadStatus::Uploaded { failed, .. } => failed == 0,
            },
            ProcessingOutcome::Failed(_) => false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct RunSummary {
    pub date: NaiveDate,
    pub elapsed: Duration,
    pub scraping: Vec<SiteScrapeReport>,
    pub processing: Vec<ProcessingReport>,
}

impl RunSummary {
    pub(crate) fn successful_scrapes(&self) -> usize {
        self.scraping.iter().filter(|r| r.succeeded()).count()
    }

    pub(crate) fn successful_processing(&self) -> usize {
        self.processing.iter().filter(|r| r.succeeded()).count()
    }

    /// The run exits 0 only when every site scraped and processed cleanly.
    pub(crate) fn succeeded(&self) -> bool {
        self.successful_scrapes() == self.scraping.len()
            && self.successful_processing() == self.processing.len()
    }
}

fn status_word(ok: bool) -> &'static str {
    if ok {
        "SUCCESS"
    } else {
        "FAILED"
    }
}

impl fmt::Display for MealOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            MealStatus::Scraped { items, sections } => {
                write!(f, "{}: {items} items from {sections} stations", self.meal)
            }
            MealStatus::NoItems { sections } => {
                write!(f, "{}: no items ({sections} stations found)", self.meal)
            }
            MealStatus::Failed(reason) => write!(f, "{}: failed ({reason})", self.meal),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(
            f,
            "Run for {} finished in {:.2}s",
            self.date,
            self.elapsed.as_secs_f64()
        )?;

        writeln!(
            f,
            "Scraping: {}/{} sites succeeded",
            self.successful_scrapes(),
            self.scraping.len()
        )?;
        for report in &self.scraping {
            match &report.outcome {
                ScrapeOutcome::ApiBased => {
                    writeln!(f, "  SKIPPED {} (api-based)", report.key)?;
                }
                ScrapeOutcome::SessionFailed(reason) => {
                    writeln!(f, "  FAILED  {} (browser: {reason})", report.key)?;
                }
                ScrapeOutcome::Meals(meals) => {
                    writeln!(f, "  {:<7} {}", status_word(report.succeeded()), report.key)?;
                    for meal in meals {
                        writeln!(f, "          {meal}")?;
                    }
                }
            }
        }

        writeln!(
            f,
            "Processing: {}/{} sites succeeded",
            self.successful_processing(),
            self.processing.len()
        )?;
        for report in &self.processing {
            let status = status_word(report.succeeded());
            match &report.outcome {
                ProcessingOutcome::ApiBased => {
                    writeln!(f, "  SKIPPED {} (api-based)", report.key)?;
                }
                ProcessingOutcome::Processed { records, upload } => match upload {
                    UploadStatus::Disabled => writeln!(
                        f,
                        "  {status:<7} {}: {records} records written, upload disabled",
                        report.key
                    )?,
                    UploadStatus::Uploaded { inserted, failed } => writeln!(
                        f,
                        "  {status:<7} {}: {records} records written, {inserted} uploaded, {failed} rejected",
                        report.key
                    )?,
                },
                ProcessingOutcome::Failed(reason) => {
                    writeln!(f, "  {status:<7} {}: {reason}", report.key)?;
                }
            }
        }
        write!(f, "{}", "=".repeat(60))
    }
}
