//! Menu item and nutrient record types shared by the scraper, the sink, and
//! the CLI.
//!
//! ## Nutrient values
//!
//! Popup transcripts encode quantities in three ways, and each survives into
//! the stored record:
//!
//! - a plain number (`"340"`, `"2.5"`, `"10+"`) becomes [`NutrientValue::Amount`]
//!   and serializes as a JSON number;
//! - `"less than 1 gram"` becomes [`NutrientValue::LessThan`] and serializes
//!   as the string `"<1"`;
//! - anything matched by a nutrient label that will not parse as a number is
//!   kept verbatim as [`NutrientValue::Unparsed`].
//!
//! A field that was not found at all is `None` and is omitted from the
//! serialized mapping; it is never written as `null`.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::meal::MealType;

/// Transcript recorded when an item's nutrition popup could not be read.
pub const NUTRITION_UNAVAILABLE: &str = "Nutrition info not available";

/// One row as read off a menu page, before normalization.
///
/// Field names match the raw JSON artifacts written per meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMenuItem {
    pub station_name: String,
    pub food_name: String,
    /// Popup text, or [`NUTRITION_UNAVAILABLE`].
    pub nutritional_info: String,
}

impl RawMenuItem {
    #[must_use]
    pub fn has_transcript(&self) -> bool {
        self.nutritional_info != NUTRITION_UNAVAILABLE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NutrientValue {
    Amount(f64),
    /// Upper bound from a "less than N" phrase; holds `N` as written.
    LessThan(String),
    Unparsed(String),
}

impl NutrientValue {
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NutrientValue::Amount(v) => Some(*v),
            NutrientValue::LessThan(_) | NutrientValue::Unparsed(_) => None,
        }
    }
}

impl Serialize for NutrientValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NutrientValue::Amount(v) => serializer.serialize_f64(*v),
            NutrientValue::LessThan(bound) => serializer.serialize_str(&format!("<{bound}")),
            NutrientValue::Unparsed(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for NutrientValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Number(v) => NutrientValue::Amount(v),
            Repr::Text(text) => match text.strip_prefix('<') {
                Some(bound) => NutrientValue::LessThan(bound.to_string()),
                None => NutrientValue::Unparsed(text),
            },
        })
    }
}

/// Structured nutrition facts recovered from a popup transcript.
///
/// `allergens` and `ingredients` are always serialized, empty when the
/// transcript did not mention them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_g: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_fat_g: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat_g: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trans_fat_g: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol_mg: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_fiber_g: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium_mg: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potassium_mg: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium_mg: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iron_mg: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_d_iu: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_c_mg: Option<NutrientValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_a_re: Option<NutrientValue>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub ingredients: String,
}

impl Nutrition {
    /// Mutable slot for the nutrient stored under `key`, e.g. `"sodium_mg"`.
    pub fn nutrient_mut(&mut self, key: &str) -> Option<&mut Option<NutrientValue>> {
        let slot = match key {
            "protein_g" => &mut self.protein_g,
            "carbs_g" => &mut self.carbs_g,
            "sugar_g" => &mut self.sugar_g,
            "total_fat_g" => &mut self.total_fat_g,
            "saturated_fat_g" => &mut self.saturated_fat_g,
            "trans_fat_g" => &mut self.trans_fat_g,
            "cholesterol_mg" => &mut self.cholesterol_mg,
            "dietary_fiber_g" => &mut self.dietary_fiber_g,
            "sodium_mg" => &mut self.sodium_mg,
            "potassium_mg" => &mut self.potassium_mg,
            "calcium_mg" => &mut self.calcium_mg,
            "iron_mg" => &mut self.iron_mg,
            "vitamin_d_iu" => &mut self.vitamin_d_iu,
            "vitamin_c_mg" => &mut self.vitamin_c_mg,
            "vitamin_a_re" => &mut self.vitamin_a_re,
            _ => return None,
        };
        Some(slot)
    }

    /// All present nutrient fields (excluding calories) with their keys.
    #[must_use]
    pub fn nutrients(&self) -> Vec<(&'static str, &NutrientValue)> {
        [
            ("protein_g", &self.protein_g),
            ("carbs_g", &self.carbs_g),
            ("sugar_g", &self.sugar_g),
            ("total_fat_g", &self.total_fat_g),
            ("saturated_fat_g", &self.saturated_fat_g),
            ("trans_fat_g", &self.trans_fat_g),
            ("cholesterol_mg", &self.cholesterol_mg),
            ("dietary_fiber_g", &self.dietary_fiber_g),
            ("sodium_mg", &self.sodium_mg),
            ("potassium_mg", &self.potassium_mg),
            ("calcium_mg", &self.calcium_mg),
            ("iron_mg", &self.iron_mg),
            ("vitamin_d_iu", &self.vitamin_d_iu),
            ("vitamin_c_mg", &self.vitamin_c_mg),
            ("vitamin_a_re", &self.vitamin_a_re),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, v)))
        .collect()
    }

    /// `true` when neither calories nor any nutrient field was recovered.
    #[must_use]
    pub fn is_empty_of_nutrients(&self) -> bool {
        self.calories.is_none() && self.nutrients().is_empty()
    }
}

/// The durable output unit: one menu item for one meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutrientRecord {
    pub meal_type: MealType,
    pub station_name: String,
    pub food_name: String,
    pub nutrition: Nutrition,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_nutrition_still_serializes_allergens_and_ingredients() {
        let json = serde_json::to_value(Nutrition::default()).unwrap();
        assert_eq!(json, serde_json::json!({"allergens": [], "ingredients": ""}));
    }

    #[test]
    fn nutrient_values_serialize_as_number_or_sentinel_string() {
        let nutrition = Nutrition {
            sodium_mg: Some(NutrientValue::Amount(340.0)),
            dietary_fiber_g: Some(NutrientValue::LessThan("1".to_string())),
            vitamin_a_re: Some(NutrientValue::Unparsed("1.2.3".to_string())),
            ..Nutrition::default()
        };
        let json = serde_json::to_value(&nutrition).unwrap();
        assert_eq!(json["sodium_mg"], serde_json::json!(340.0));
        assert_eq!(json["dietary_fiber_g"], serde_json::json!("<1"));
        assert_eq!(json["vitamin_a_re"], serde_json::json!("1.2.3"));
        assert!(json.get("protein_g").is_none(), "absent fields must be omitted");
    }

    #[test]
    fn nutrient_value_deserializes_sentinels() {
        let v: NutrientValue = serde_json::from_str("\"<5\"").unwrap();
        assert_eq!(v, NutrientValue::LessThan("5".to_string()));
        let v: NutrientValue = serde_json::from_str("12.5").unwrap();
        assert_eq!(v, NutrientValue::Amount(12.5));
        let v: NutrientValue = serde_json::from_str("\"trace\"").unwrap();
        assert_eq!(v, NutrientValue::Unparsed("trace".to_string()));
    }

    #[test]
    fn nutrient_mut_rejects_unknown_keys() {
        let mut nutrition = Nutrition::default();
        assert!(nutrition.nutrient_mut("calories").is_none());
        *nutrition.nutrient_mut("iron_mg").unwrap() = Some(NutrientValue::Amount(1.0));
        assert_eq!(nutrition.nutrients(), vec![("iron_mg", &NutrientValue::Amount(1.0))]);
    }

    #[test]
    fn unavailable_item_has_no_transcript() {
        let item = RawMenuItem {
            station_name: "Grill".to_string(),
            food_name: "Burger".to_string(),
            nutritional_info: NUTRITION_UNAVAILABLE.to_string(),
        };
        assert!(!item.has_transcript());
    }

    #[test]
    fn record_round_trips_through_json() {
        let record = NutrientRecord {
            meal_type: MealType::Dinner,
            station_name: "Grill".to_string(),
            food_name: "Burger".to_string(),
            nutrition: Nutrition {
                calories: Some(540),
                allergens: vec!["Wheat".to_string()],
                ..Nutrition::default()
            },
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"meal_type\":\"dinner\""));
        let back: NutrientRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
