//! Popup transcript to structured [`Nutrition`].
//!
//! The transcript is rendered UI text with no dependable delimiters, so each
//! field is recovered independently by anchoring on its fixed label. The
//! normalizer is total: a field it cannot resolve is left absent (or kept as
//! the raw matched string) and nothing ever fails.
//!
//! ## Value tokens
//!
//! | Token               | Result                          |
//! |---------------------|---------------------------------|
//! | `-`                 | `0`                             |
//! | `less than N gram`  | `"<N"` (`"<1"` if N is missing) |
//! | `less than .5 gram` | `"<0.5"`                        |
//! | `10+`               | `10.0`                          |
//! | `2.5`               | `2.5`                           |
//! | `1.2.3`             | `"1.2.3"` verbatim              |

use std::sync::LazyLock;

use nutrigrove_core::{NutrientValue, Nutrition};
use regex::Regex;

/// Nutrient field keys and the label that introduces each in a transcript.
const NUTRIENT_LABELS: &[(&str, &str)] = &[
    ("protein_g", r"Protein \(g\)"),
    ("carbs_g", r"Total Carbohydrates \(g\)"),
    ("sugar_g", r"Sugar \(g\)"),
    ("total_fat_g", r"Total Fat \(g\)"),
    ("saturated_fat_g", r"Saturated Fat \(g\)"),
    ("trans_fat_g", r"Trans Fat \(g\)"),
    ("cholesterol_mg", r"Cholesterol \(mg\)"),
    ("dietary_fiber_g", r"Dietary Fiber \(g\)"),
    ("sodium_mg", r"Sodium \(mg\)"),
    ("potassium_mg", r"Potassium \(mg\)"),
    ("calcium_mg", r"Calcium \(mg\)"),
    ("iron_mg", r"Iron \(mg\)"),
    ("vitamin_d_iu", r"Vitamin D \(IU\)"),
    ("vitamin_c_mg", r"Vitamin C \(mg\)"),
    ("vitamin_a_re", r"Vitamin A \(RE\)"),
];

const VALUE_TOKEN: &str = r"(less than(?:\s+[\d.]+)?(?:\s+[a-z]+)?|-|[\d.]+\+?)";

static NUTRIENT_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    NUTRIENT_LABELS
        .iter()
        .map(|(key, label)| {
            let pattern = format!(r"(?i){label}\s+{VALUE_TOKEN}");
            (*key, Regex::new(&pattern).expect("valid nutrient regex"))
        })
        .collect()
});

static SERVING_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Serving size:\s*").expect("valid serving regex"));
static CALORIES_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Calories").expect("valid calories marker regex"));
// Case-sensitive: lowercase "calories" inside a serving description is not
// the calorie count.
static CALORIES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Calories\s+(\d+)").expect("valid calories regex"));
static ALLERGENS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Allergens:\s*").expect("valid allergens regex"));
static INGREDIENTS_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Ingredients").expect("valid ingredients marker regex"));
static INGREDIENTS_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Ingredients:\s*").expect("valid ingredients regex"));
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d*\.?\d+").expect("valid number regex"));

/// Convert a raw popup transcript into structured nutrition facts.
#[must_use]
pub fn normalize(raw: &str) -> Nutrition {
    let text = preprocess(raw);

    let mut nutrition = Nutrition {
        serving_size: serving_size(&text),
        calories: calories(&text),
        allergens: allergens(&text),
        ingredients: ingredients(&text),
        ..Nutrition::default()
    };

    for (key, pattern) in NUTRIENT_PATTERNS.iter() {
        let Some(token) = pattern.captures(&text).and_then(|c| c.get(1)) else {
            continue;
        };
        if let Some(slot) = nutrition.nutrient_mut(key) {
            *slot = Some(resolve_value(token.as_str().trim()));
        }
    }

    nutrition
}

/// Newlines to spaces, drop the popup's "Close" button text, collapse
/// whitespace runs.
fn preprocess(raw: &str) -> String {
    raw.replace('\n', " ")
        .replace("Close", "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_value(token: &str) -> NutrientValue {
    if token == "-" {
        return NutrientValue::Amount(0.0);
    }

    if token.to_lowercase().starts_with("less than") {
        let bound = match NUMBER_RE.find(token).map(|m| m.as_str()) {
            Some(n) if n.starts_with('.') => format!("0{n}"),
            Some(n) => n.to_string(),
            None => "1".to_string(),
        };
        return NutrientValue::LessThan(bound);
    }

    let numeric = token.strip_suffix('+').unwrap_or(token);
    match numeric.parse::<f64>() {
        Ok(value) if value.is_finite() => NutrientValue::Amount(value),
        _ => NutrientValue::Unparsed(token.to_string()),
    }
}

/// Text after "Serving size:" up to the next "Calories" or the end. A
/// segment containing `%` is daily-value noise, not a serving size.
fn serving_size(text: &str) -> Option<String> {
    let label = SERVING_LABEL_RE.find(text)?;
    let rest = &text[label.end()..];
    let end = CALORIES_MARKER_RE.find(rest).map_or(rest.len(), |m| m.start());
    let segment = rest[..end].trim();
    if segment.is_empty() || segment.contains('%') {
        return None;
    }
    Some(segment.to_string())
}

fn calories(text: &str) -> Option<u64> {
    let digits = CALORIES_RE.captures(text)?.get(1)?.as_str();
    match digits.parse() {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::debug!(digits, error = %e, "calorie count out of range");
            None
        }
    }
}

/// Comma-separated list between "Allergens:" and the next "Ingredients".
fn allergens(text: &str) -> Vec<String> {
    let Some(label) = ALLERGENS_LABEL_RE.find(text) else {
        return Vec::new();
    };
    let rest = &text[label.end()..];
    let end = INGREDIENTS_MARKER_RE
        .find(rest)
        .map_or(rest.len(), |m| m.start());
    let segment = &rest[..end];
    if segment.contains('*') {
        return Vec::new();
    }
    segment
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// Text between "Ingredients:" and the next `*`, with `^` markers removed.
fn ingredients(text: &str) -> String {
    let Some(label) = INGREDIENTS_LABEL_RE.find(text) else {
        return String::new();
    };
    let rest = &text[label.end()..];
    let end = rest.find('*').unwrap_or(rest.len());
    rest[..end].replace('^', "").trim().to_string()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
