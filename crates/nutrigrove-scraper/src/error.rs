use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Chrome could not be found or launched, or a CDP command failed.
    #[error("browser error: {0}")]
    Browser(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("challenge screen at {url} did not clear within {waited_secs}s")]
    ChallengeTimeout { url: String, waited_secs: u64 },

    /// A section, row, popup, or close control was missing. Always handled
    /// by the unit that raised it.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("in-page script failed: {0}")]
    Script(String),
}

impl ScraperError {
    /// Meal-level failures abort the current meal; everything else is
    /// absorbed by the section or row being processed.
    #[must_use]
    pub fn is_meal_level(&self) -> bool {
        matches!(
            self,
            ScraperError::Navigation { .. } | ScraperError::ChallengeTimeout { .. }
        )
    }
}

impl From<chromiumoxide::error::CdpError> for ScraperError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScraperError::Browser(err.to_string())
    }
}
