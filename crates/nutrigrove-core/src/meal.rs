use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    /// Path segment and file-name fragment for this meal.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            other => Err(format!(
                "unknown meal type '{other}'; expected breakfast, lunch, or dinner"
            )),
        }
    }
}

/// How weekend menus are scraped.
///
/// Dining halls serve brunch on Saturday and Sunday. Sites publish it under
/// the breakfast path, so the policy decides whether that slot is scraped and
/// whether lunch is attempted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekendPolicy {
    /// Scrape breakfast, lunch, and dinner every day.
    AllMeals,
    /// Weekends scrape breakfast (holding brunch) and dinner.
    #[default]
    BrunchAsBreakfast,
    /// Weekends scrape dinner only.
    SkipBrunch,
}

impl WeekendPolicy {
    /// Meals to scrape for `date`, in scrape order.
    #[must_use]
    pub fn meals_for(self, date: NaiveDate) -> Vec<MealType> {
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        if !weekend {
            return MealType::ALL.to_vec();
        }
        match self {
            WeekendPolicy::AllMeals => MealType::ALL.to_vec(),
            WeekendPolicy::BrunchAsBreakfast => vec![MealType::Breakfast, MealType::Dinner],
            WeekendPolicy::SkipBrunch => vec![MealType::Dinner],
        }
    }
}

impl std::fmt::Display for WeekendPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekendPolicy::AllMeals => write!(f, "all-meals"),
            WeekendPolicy::BrunchAsBreakfast => write!(f, "brunch-as-breakfast"),
            WeekendPolicy::SkipBrunch => write!(f, "skip-brunch"),
        }
    }
}

impl std::str::FromStr for WeekendPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "all-meals" => Ok(WeekendPolicy::AllMeals),
            "brunch-as-breakfast" => Ok(WeekendPolicy::BrunchAsBreakfast),
            "skip-brunch" => Ok(WeekendPolicy::SkipBrunch),
            other => Err(format!(
                "unknown weekend policy '{other}'; expected all-meals, brunch-as-breakfast, or skip-brunch"
            )),
        }
    }
}
