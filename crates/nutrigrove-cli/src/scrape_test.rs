use std::sync::Mutex;

use nutrigrove_core::{Nutrition, RawMenuItem, SectionLayoutConfig};
use nutrigrove_sink::{RecordId, SinkError};

use super::*;

#[derive(Default)]
struct MemorySink {
    rejected: Vec<&'static str>,
    inserted: Mutex<Vec<NutrientRecord>>,
}

impl RecordSink for MemorySink {
    async fn insert(&self, record: &NutrientRecord) -> Result<RecordId, SinkError> {
        if self.rejected.contains(&record.food_name.as_str()) {
            return Err(SinkError::UnexpectedStatus {
                status: 400,
                url: "memory".to_string(),
                body: "rejected".to_string(),
            });
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(record.clone());
        Ok(inserted.len().to_string())
    }
}

fn record(meal: MealType, food: &str) -> NutrientRecord {
    NutrientRecord {
        meal_type: meal,
        station_name: "Grill".to_string(),
        food_name: food.to_string(),
        nutrition: Nutrition::default(),
    }
}

fn meal_scrape(meal: MealType, foods: &[&str]) -> MealScrape {
    MealScrape {
        meal,
        records: foods.iter().map(|f| record(meal, f)).collect(),
        raw_items: foods
            .iter()
            .map(|f| RawMenuItem {
                station_name: "Grill".to_string(),
                food_name: (*f).to_string(),
                nutritional_info: String::new(),
            })
            .collect(),
        sections_found: 1,
    }
}

fn site_run(outcome: ScrapeOutcome, scrapes: Vec<MealScrape>) -> SiteRun {
    SiteRun {
        key: "umassd".to_string(),
        table: "cleaned_data".to_string(),
        report: SiteScrapeReport {
            key: "umassd".to_string(),
            outcome,
        },
        scrapes,
    }
}

fn ran(meals: &[MealType]) -> ScrapeOutcome {
    ScrapeOutcome::Meals(
        meals
            .iter()
            .map(|&meal| MealOutcome {
                meal,
                status: MealStatus::Scraped {
                    items: 1,
                    sections: 1,
                },
            })
            .collect(),
    )
}

#[tokio::test]
async fn processing_writes_cleaned_files_and_uploads() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArtifactWriter::new(dir.path());
    let run = site_run(
        ran(&[MealType::Breakfast, MealType::Dinner]),
        vec![
            meal_scrape(MealType::Breakfast, &["Oatmeal", "Bagel"]),
            meal_scrape(MealType::Dinner, &["Pasta"]),
        ],
    );
    let sink = MemorySink::default();

    let report = process_site(&run, &writer, Some(&sink)).await;

    assert_eq!(
        report.outcome,
        ProcessingOutcome::Processed {
            records: 3,
            upload: UploadStatus::Uploaded {
                inserted: 3,
                failed: 0
            },
        }
    );
    assert!(writer.cleaned_path("umassd", MealType::Breakfast).exists());
    assert!(writer.cleaned_path("umassd", MealType::Dinner).exists());
    let combined: Vec<NutrientRecord> = serde_json::from_str(
        &std::fs::read_to_string(writer.combined_path("umassd")).unwrap(),
    )
    .unwrap();
    let names: Vec<_> = combined.iter().map(|r| r.food_name.as_str()).collect();
    assert_eq!(names, vec!["Oatmeal", "Bagel", "Pasta"]);
    assert_eq!(sink.inserted.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn rejected_records_fail_processing_but_rest_upload() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArtifactWriter::new(dir.path());
    let run = site_run(
        ran(&[MealType::Lunch]),
        vec![meal_scrape(MealType::Lunch, &["Burger", "Mystery", "Salad"])],
    );
    let sink = MemorySink {
        rejected: vec!["Mystery"],
        ..MemorySink::default()
    };

    let report = process_site(&run, &writer, Some(&sink)).await;

    assert_eq!(
        report.outcome,
        ProcessingOutcome::Processed {
            records: 3,
            upload: UploadStatus::Uploaded {
                inserted: 2,
                failed: 1
            },
        }
    );
    assert!(!report.succeeded());
}

#[tokio::test]
async fn processing_without_sink_only_writes() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArtifactWriter::new(dir.path());
    let run = site_run(
        ran(&[MealType::Lunch]),
        vec![meal_scrape(MealType::Lunch, &["Burger"])],
    );

    let report = process_site::<MemorySink>(&run, &writer, None).await;

    assert_eq!(
        report.outcome,
        ProcessingOutcome::Processed {
            records: 1,
            upload: UploadStatus::Disabled,
        }
    );
    assert!(report.succeeded());
}

#[tokio::test]
async fn site_with_no_records_fails_processing() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArtifactWriter::new(dir.path());
    let run = site_run(
        ScrapeOutcome::Meals(vec![MealOutcome {
            meal: MealType::Lunch,
            status: MealStatus::Failed("navigation timed out".to_string()),
        }]),
        Vec::new(),
    );

    let report = process_site::<MemorySink>(&run, &writer, None).await;

    assert_eq!(
        report.outcome,
        ProcessingOutcome::Failed("no records to process".to_string())
    );
    assert!(!writer.combined_path("umassd").exists());
}

#[tokio::test]
async fn api_based_and_failed_sessions_are_not_processed() {
    let dir = tempfile::tempdir().unwrap();
    let writer = ArtifactWriter::new(dir.path());
    let sink = MemorySink::default();

    let api = process_site(&site_run(ScrapeOutcome::ApiBased, Vec::new()), &writer, Some(&sink)).await;
    assert_eq!(api.outcome, ProcessingOutcome::ApiBased);

    let broken = process_site(
        &site_run(ScrapeOutcome::SessionFailed("no chrome".to_string()), Vec::new()),
        &writer,
        Some(&sink),
    )
    .await;
    assert!(!broken.succeeded());
    assert!(sink.inserted.lock().unwrap().is_empty());
}

#[test]
fn session_options_follow_config_and_site() {
    let config = nutrigrove_core::load_app_config_from_env().unwrap();
    let site = SiteConfig {
        key: "umassd".to_string(),
        name: "UMass Dartmouth".to_string(),
        url_template: "https://example.edu/menu".to_string(),
        requires_date: true,
        requires_meal_type: true,
        api_based: false,
        table: "cleaned_data".to_string(),
        layout: SectionLayoutConfig::Auto,
        probe_path: None,
        stealth: false,
        challenge_handling: true,
    };

    let options = session_options(&config, &site);

    assert!(!options.stealth);
    assert_eq!(options.headless, config.headless);
    assert_eq!(
        options.navigation_timeout,
        Duration::from_secs(config.navigation_timeout_secs)
    );
    assert_eq!(options.settle, Duration::from_secs(config.page_settle_secs));
}
