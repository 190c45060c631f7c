//! The menu scraping engine: one meal page from navigation to records.

use std::time::Duration;

use nutrigrove_core::{MealType, NutrientRecord, RawMenuItem};

use crate::dom::MenuPage;
use crate::emitter::RecordEmitter;
use crate::error::ScraperError;
use crate::profile::{Pacing, SiteProfile};
use crate::sections::discover_sections;
use crate::session::await_stable;
use crate::walker::walk_section;

/// Everything collected from one meal page.
#[derive(Debug, Clone)]
pub struct MealScrape {
    pub meal: MealType,
    pub records: Vec<NutrientRecord>,
    /// Items as read off the page, before normalization.
    pub raw_items: Vec<RawMenuItem>,
    pub sections_found: usize,
}

impl MealScrape {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw_items.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MenuScraper {
    profile: SiteProfile,
    pacing: Pacing,
    challenge_timeout: Duration,
}

impl MenuScraper {
    #[must_use]
    pub fn new(profile: SiteProfile, pacing: Pacing, challenge_timeout: Duration) -> Self {
        Self {
            profile,
            pacing,
            challenge_timeout,
        }
    }

    #[must_use]
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// Scrape the menu for `meal` at `url`.
    ///
    /// Section and row failures are absorbed; a meal with zero items is
    /// still `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Navigation`] if the page does not load and
    /// [`ScraperError::ChallengeTimeout`] if a challenge screen outlasts the
    /// configured wait.
    pub async fn scrape_meal<P: MenuPage>(
        &self,
        page: &P,
        meal: MealType,
        url: &str,
    ) -> Result<MealScrape, ScraperError> {
        let site = self.profile.key.as_str();
        tracing::info!(site, meal = %meal, url, "scraping meal");

        page.navigate(url).await?;

        if self.profile.challenge_handling && !await_stable(page, self.challenge_timeout).await {
            return Err(ScraperError::ChallengeTimeout {
                url: url.to_string(),
                waited_secs: self.challenge_timeout.as_secs(),
            });
        }

        let sections = discover_sections(page, &self.profile).await;
        let sections_found = sections.len();

        let mut emitter = RecordEmitter::new(meal);
        let mut raw_items = Vec::new();
        for section in &sections {
            let items = walk_section(page, section, &self.profile, &self.pacing).await;
            tracing::info!(
                site,
                meal = %meal,
                station = %section.label,
                items = items.len(),
                "section scraped"
            );
            for item in items {
                raw_items.push(item.clone());
                emitter.emit(item);
            }
        }

        let records = emitter.flush();
        if raw_items.is_empty() {
            tracing::warn!(site, meal = %meal, sections = sections_found, "no items found");
        } else {
            tracing::info!(
                site,
                meal = %meal,
                sections = sections_found,
                items = raw_items.len(),
                "meal scraped"
            );
        }

        Ok(MealScrape {
            meal,
            records,
            raw_items,
            sections_found,
        })
    }
}
