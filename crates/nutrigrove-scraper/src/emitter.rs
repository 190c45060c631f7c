use nutrigrove_core::{MealType, NutrientRecord, RawMenuItem};

use crate::normalize::normalize;

/// Collects one meal's records in discovery order until they are handed to
/// the sink.
#[derive(Debug)]
pub struct RecordEmitter {
    meal: MealType,
    records: Vec<NutrientRecord>,
}

impl RecordEmitter {
    #[must_use]
    pub fn new(meal: MealType) -> Self {
        Self {
            meal,
            records: Vec::new(),
        }
    }

    /// Normalize `raw` and append it. Items without a food name are dropped.
    pub fn emit(&mut self, raw: RawMenuItem) {
        if let Some(record) = to_record(raw, self.meal) {
            self.records.push(record);
        }
    }

    pub fn emit_record(&mut self, record: NutrientRecord) {
        self.records.push(record);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take every accumulated record, leaving the emitter empty.
    pub fn flush(&mut self) -> Vec<NutrientRecord> {
        std::mem::take(&mut self.records)
    }
}

/// Normalize a raw item into a record for `meal`.
///
/// Returns `None` for an empty food name. An empty station name becomes
/// `"Station 1"`.
#[must_use]
pub fn to_record(raw: RawMenuItem, meal: MealType) -> Option<NutrientRecord> {
    let food_name = raw.food_name.trim();
    if food_name.is_empty() {
        return None;
    }
    let station_name = match raw.station_name.trim() {
        "" => "Station 1".to_string(),
        name => name.to_string(),
    };
    Some(NutrientRecord {
        meal_type: meal,
        station_name,
        food_name: food_name.to_string(),
        nutrition: normalize(&raw.nutritional_info),
    })
}
