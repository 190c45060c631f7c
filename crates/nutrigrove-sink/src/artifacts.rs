//! JSON artifacts of a scrape run, rooted at one explicit output directory.
//!
//! ```text
//! {out}/scraped/{site}/food_items_{meal}.json     raw items
//! {out}/cleaned/{site}/food_items_{meal}.json     nutrient records
//! {out}/cleaned/{site}/all_food_items_cleaned.json
//! ```

use std::path::{Path, PathBuf};

use nutrigrove_core::{MealType, NutrientRecord, RawMenuItem};
use serde::Serialize;

use crate::error::SinkError;

const COMBINED_FILE: &str = "all_food_items_cleaned.json";

#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: output_dir.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn scraped_path(&self, site: &str, meal: MealType) -> PathBuf {
        self.root
            .join("scraped")
            .join(site)
            .join(format!("food_items_{meal}.json"))
    }

    #[must_use]
    pub fn cleaned_path(&self, site: &str, meal: MealType) -> PathBuf {
        self.root
            .join("cleaned")
            .join(site)
            .join(format!("food_items_{meal}.json"))
    }

    #[must_use]
    pub fn combined_path(&self, site: &str) -> PathBuf {
        self.root.join("cleaned").join(site).join(COMBINED_FILE)
    }

    /// Write one meal's raw items.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the directory or file cannot be written.
    pub fn write_raw(
        &self,
        site: &str,
        meal: MealType,
        items: &[RawMenuItem],
    ) -> Result<PathBuf, SinkError> {
        let path = self.scraped_path(site, meal);
        write_json(&path, items)?;
        Ok(path)
    }

    /// Write one meal's normalized records.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the directory or file cannot be written.
    pub fn write_cleaned(
        &self,
        site: &str,
        meal: MealType,
        records: &[NutrientRecord],
    ) -> Result<PathBuf, SinkError> {
        let path = self.cleaned_path(site, meal);
        write_json(&path, records)?;
        Ok(path)
    }

    /// Write the records of every meal of the run, concatenated.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the directory or file cannot be written.
    pub fn write_combined(
        &self,
        site: &str,
        records: &[NutrientRecord],
    ) -> Result<PathBuf, SinkError> {
        let path = self.combined_path(site);
        write_json(&path, records)?;
        Ok(path)
    }
}

/// Load raw items previously written by [`ArtifactWriter::write_raw`].
///
/// # Errors
///
/// Returns [`SinkError::Io`] if the file cannot be read and
/// [`SinkError::Deserialize`] if it is not a raw-item array.
pub fn read_raw_items(path: &Path) -> Result<Vec<RawMenuItem>, SinkError> {
    let content = std::fs::read_to_string(path).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SinkError::Deserialize {
        context: path.display().to_string(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SinkError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| SinkError::Serialize {
        context: path.display().to_string(),
        source,
    })?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| SinkError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, json).map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "artifact written");
    Ok(())
}
