//! Per-site capability descriptor and interaction pacing.
//!
//! One [`crate::MenuScraper`] serves every site; what differs between sites
//! (how sections are found, which selectors apply, whether stealth and
//! challenge handling are on) lives here.

use std::time::Duration;

use nutrigrove_core::{SectionLayoutConfig, SiteConfig};

/// Heading-like elements searched for a section's label.
pub const HEADING_SELECTOR: &str =
    "h1, h2, h3, h4, h5, h6, .station-name, [class*='station'], [class*='title']";

pub const SECTION_SELECTOR: &str = "table";
pub const ROW_SELECTOR: &str = "tr";
pub const CELL_SELECTOR: &str = "td";

/// Click targets inside a row's first cell, tried in order.
pub const CLICKABLE_SELECTORS: &[&str] = &[
    "button",
    "[role='button']",
    "span[class*='click']",
    "div[class*='click']",
];

/// Popup containers, tried in order.
pub const POPUP_SELECTORS: &[&str] = &[
    "[role='dialog']",
    ".modal",
    ".popup",
    "div[class*='modal']",
    "div[class*='popup']",
    "div[class*='nutrition']",
    "div[class*='detail']",
];

/// Popup close controls, tried in order.
pub const CLOSE_SELECTORS: &[&str] = &[
    "button[aria-label*='close']",
    ".close",
    ".close-button",
    "button[class*='close']",
    "[data-dismiss]",
    "button:last-child",
];

/// Row names that mark header or summary rows rather than food.
pub const NON_FOOD_NAMES: &[&str] = &["portion", "calories", ""];

/// Ancestor levels searched for a section heading.
pub const LABEL_SEARCH_LEVELS: usize = 3;

/// Upper bound on positional probing.
pub const DEFAULT_PROBE_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionLayout {
    Tables,
    /// XPath template with `{index}` replaced by 1, 2, 3, ...
    Probed { path: String },
    /// Tables first; probing when none are found and a path is known.
    Auto { path: Option<String> },
}

#[derive(Debug, Clone)]
pub struct Selectors {
    pub heading: String,
    pub section: String,
    pub row: String,
    pub cell: String,
    pub clickable: Vec<String>,
    pub popup: Vec<String>,
    pub close: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        let owned =
            |list: &[&str]| -> Vec<String> { list.iter().map(ToString::to_string).collect() };
        Self {
            heading: HEADING_SELECTOR.to_string(),
            section: SECTION_SELECTOR.to_string(),
            row: ROW_SELECTOR.to_string(),
            cell: CELL_SELECTOR.to_string(),
            clickable: owned(CLICKABLE_SELECTORS),
            popup: owned(POPUP_SELECTORS),
            close: owned(CLOSE_SELECTORS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub key: String,
    pub layout: SectionLayout,
    pub stealth: bool,
    pub challenge_handling: bool,
    pub selectors: Selectors,
    pub probe_limit: usize,
}

impl SiteProfile {
    #[must_use]
    pub fn new(key: impl Into<String>, layout: SectionLayout) -> Self {
        Self {
            key: key.into(),
            layout,
            stealth: true,
            challenge_handling: true,
            selectors: Selectors::default(),
            probe_limit: DEFAULT_PROBE_LIMIT,
        }
    }
}

impl From<&SiteConfig> for SiteProfile {
    fn from(site: &SiteConfig) -> Self {
        let layout = match (site.layout, site.probe_path.clone()) {
            (SectionLayoutConfig::Tables, _) => SectionLayout::Tables,
            (SectionLayoutConfig::Probed, Some(path)) => SectionLayout::Probed { path },
            // Validation rejects probed-without-path; degrade to tables.
            (SectionLayoutConfig::Probed, None) => SectionLayout::Tables,
            (SectionLayoutConfig::Auto, path) => SectionLayout::Auto { path },
        };
        Self {
            stealth: site.stealth,
            challenge_handling: site.challenge_handling,
            ..Self::new(site.key.clone(), layout)
        }
    }
}

/// Fixed waits that pace interactions like a person would.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After scrolling a click target into view.
    pub scroll_settle: Duration,
    /// After clicking, before looking for the popup.
    pub click_settle: Duration,
    /// After dismissing a popup.
    pub close_settle: Duration,
    /// How long each popup candidate selector is waited for.
    pub popup_wait: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            scroll_settle: Duration::from_secs(1),
            click_settle: Duration::from_secs(3),
            close_settle: Duration::from_secs(1),
            popup_wait: Duration::from_secs(5),
        }
    }
}

impl Pacing {
    /// No waiting at all.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            scroll_settle: Duration::ZERO,
            click_settle: Duration::ZERO,
            close_settle: Duration::ZERO,
            popup_wait: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn with_popup_wait(mut self, popup_wait: Duration) -> Self {
        self.popup_wait = popup_wait;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(layout: SectionLayoutConfig, probe_path: Option<&str>) -> SiteConfig {
        SiteConfig {
            key: "grove".to_string(),
            name: "The Grove".to_string(),
            url_template: "https://example.edu/menu".to_string(),
            requires_date: true,
            requires_meal_type: true,
            api_based: false,
            table: "cleaned_data".to_string(),
            layout,
            probe_path: probe_path.map(str::to_string),
            stealth: false,
            challenge_handling: true,
        }
    }

    #[test]
    fn profile_carries_site_capabilities() {
        let profile = SiteProfile::from(&site(SectionLayoutConfig::Tables, None));
        assert_eq!(profile.key, "grove");
        assert_eq!(profile.layout, SectionLayout::Tables);
        assert!(!profile.stealth);
        assert!(profile.challenge_handling);
        assert_eq!(profile.probe_limit, DEFAULT_PROBE_LIMIT);
    }

    #[test]
    fn probed_layout_keeps_its_path() {
        let profile = SiteProfile::from(&site(
            SectionLayoutConfig::Probed,
            Some("//div[{index}]/table"),
        ));
        assert_eq!(
            profile.layout,
            SectionLayout::Probed {
                path: "//div[{index}]/table".to_string()
            }
        );
    }

    #[test]
    fn auto_layout_path_is_optional() {
        let profile = SiteProfile::from(&site(SectionLayoutConfig::Auto, None));
        assert_eq!(profile.layout, SectionLayout::Auto { path: None });
    }

    #[test]
    fn default_selectors_try_dialog_role_first() {
        let selectors = Selectors::default();
        assert_eq!(selectors.popup.first().map(String::as_str), Some("[role='dialog']"));
        assert_eq!(selectors.close.last().map(String::as_str), Some("button:last-child"));
        assert_eq!(selectors.clickable.len(), 4);
    }

    #[test]
    fn default_pacing_matches_human_delays() {
        let pacing = Pacing::default();
        assert_eq!(pacing.scroll_settle, Duration::from_secs(1));
        assert_eq!(pacing.click_settle, Duration::from_secs(3));
        assert_eq!(pacing.close_settle, Duration::from_secs(1));
        assert_eq!(pacing.popup_wait, Duration::from_secs(5));
        assert_eq!(Pacing::instant().popup_wait, Duration::ZERO);
    }
}
