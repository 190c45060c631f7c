//! The `normalize` command: turn a saved raw-item file back into nutrient
//! records without touching a browser.

use std::path::Path;

use anyhow::Context;
use nutrigrove_core::{MealType, NutrientRecord, RawMenuItem};
use nutrigrove_scraper::RecordEmitter;

pub(crate) fn run_normalize(input: &Path, meal: Option<MealType>) -> anyhow::Result<()> {
    let meal = match meal {
        Some(meal) => meal,
        None => meal_from_file_name(input).with_context(|| {
            format!(
                "cannot infer the meal from {}; pass --meal",
                input.display()
            )
        })?,
    };
    let items = nutrigrove_sink::read_raw_items(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let records = normalize_items(items, meal);
    tracing::info!(input = %input.display(), meal = %meal, records = records.len(), "normalized");
    println!(
        "{}",
        serde_json::to_string_pretty(&records).context("serializing records")?
    );
    Ok(())
}

pub(crate) fn normalize_items(items: Vec<RawMenuItem>, meal: MealType) -> Vec<NutrientRecord> {
    let mut emitter = RecordEmitter::new(meal);
    for item in items {
        emitter.emit(item);
    }
    emitter.flush()
}

/// `food_items_lunch.json` -> lunch.
pub(crate) fn meal_from_file_name(path: &Path) -> Option<MealType> {
    let stem = path.file_stem()?.to_str()?;
    stem.rsplit('_').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use nutrigrove_core::NUTRITION_UNAVAILABLE;

    use super::*;

    #[test]
    fn infers_meal_from_artifact_name() {
        assert_eq!(
            meal_from_file_name(Path::new("data/scraped/umassd/food_items_dinner.json")),
            Some(MealType::Dinner)
        );
        assert_eq!(meal_from_file_name(Path::new("items.json")), None);
    }

    #[test]
    fn normalizes_items_in_order() {
        let items = vec![
            RawMenuItem {
                station_name: "Grill".to_string(),
                food_name: "Burger".to_string(),
                nutritional_info: "Calories 540 Sodium (mg) 980".to_string(),
            },
            RawMenuItem {
                station_name: String::new(),
                food_name: "Fries".to_string(),
                nutritional_info: NUTRITION_UNAVAILABLE.to_string(),
            },
        ];

        let records = normalize_items(items, MealType::Lunch);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].nutrition.calories, Some(540));
        assert_eq!(records[1].station_name, "Station 1");
        assert!(records[1].nutrition.is_empty_of_nutrients());
    }

    #[test]
    fn normalizes_a_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("food_items_breakfast.json");
        std::fs::write(
            &path,
            r#"[{"station_name":"Bakery","food_name":"Bagel","nutritional_info":"Calories 280"}]"#,
        )
        .unwrap();

        run_normalize(&path, None).unwrap();
        assert!(run_normalize(&dir.path().join("missing_lunch.json"), None).is_err());
    }
}
