use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::meal::MealType;
use crate::ConfigError;

/// How menu sections are located on a site's page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionLayoutConfig {
    /// Every `table` element on the page is a section.
    Tables,
    /// Sections are only reachable through `probe_path` with `{index}`
    /// substituted for 1, 2, 3, ...
    Probed,
    /// Try tables first, then fall back to probing when a path is configured.
    #[default]
    Auto,
}

impl std::fmt::Display for SectionLayoutConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SectionLayoutConfig::Tables => write!(f, "tables"),
            SectionLayoutConfig::Probed => write!(f, "probed"),
            SectionLayoutConfig::Auto => write!(f, "auto"),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub key: String,
    pub name: String,
    pub url_template: String,
    #[serde(default)]
    pub requires_date: bool,
    #[serde(default)]
    pub requires_meal_type: bool,
    /// Site exposes structured data through an API; its ingestion happens
    /// elsewhere and the browser scraper skips it.
    #[serde(default)]
    pub api_based: bool,
    /// Sink table receiving this site's cleaned records.
    pub table: String,
    #[serde(default)]
    pub layout: SectionLayoutConfig,
    #[serde(default)]
    pub probe_path: Option<String>,
    #[serde(default = "default_true")]
    pub stealth: bool,
    #[serde(default = "default_true")]
    pub challenge_handling: bool,
}

impl SiteConfig {
    /// Menu URL for `date` and `meal`.
    ///
    /// Trailing slashes on the template are dropped, then `/{YYYY-MM-DD}` and
    /// `/{meal}` are appended when the site asks for them.
    #[must_use]
    pub fn build_url(&self, date: NaiveDate, meal: MealType) -> String {
        let mut url = self.url_template.trim_end_matches('/').to_string();
        if self.requires_date {
            url.push('/');
            url.push_str(&date.format("%Y-%m-%d").to_string());
        }
        if self.requires_meal_type {
            url.push('/');
            url.push_str(meal.as_str());
        }
        url
    }
}

#[derive(Debug, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteConfig>,
}

impl SitesFile {
    /// Look up a site by key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSite`] when no site has that key.
    pub fn site(&self, key: &str) -> Result<&SiteConfig, ConfigError> {
        self.sites
            .iter()
            .find(|s| s.key == key)
            .ok_or_else(|| ConfigError::UnknownSite(key.to_string()))
    }

    /// Sites matching `keys` in configuration order, or every site when
    /// `keys` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSite`] for the first key that matches
    /// nothing.
    pub fn select(&self, keys: &[String]) -> Result<Vec<&SiteConfig>, ConfigError> {
        if keys.is_empty() {
            return Ok(self.sites.iter().collect());
        }
        for key in keys {
            self.site(key)?;
        }
        Ok(self
            .sites
            .iter()
            .filter(|s| keys.iter().any(|k| k == &s.key))
            .collect())
    }
}

/// Load and validate the sites configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sites(&content)
}

/// Parse and validate sites YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sites(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile =
        serde_yaml::from_str(content).map_err(ConfigError::SitesFileParse)?;

    validate_sites(&sites_file)?;

    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    let mut seen_keys = HashSet::new();

    for site in &sites_file.sites {
        if site.key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site key must be non-empty".to_string(),
            ));
        }

        if !seen_keys.insert(site.key.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site key: '{}'",
                site.key
            )));
        }

        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty name",
                site.key
            )));
        }

        if site.url_template.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty url_template",
                site.key
            )));
        }

        if site.table.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty table",
                site.key
            )));
        }

        match (&site.layout, &site.probe_path) {
            (SectionLayoutConfig::Probed, None) => {
                return Err(ConfigError::Validation(format!(
                    "site '{}' uses the probed layout but has no probe_path",
                    site.key
                )));
            }
            (_, Some(path)) if !path.contains("{index}") => {
                return Err(ConfigError::Validation(format!(
                    "site '{}' probe_path must contain '{{index}}'",
                    site.key
                )));
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
