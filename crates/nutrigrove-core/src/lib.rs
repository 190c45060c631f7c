pub mod app_config;
pub mod config;
pub mod meal;
pub mod nutrition;
pub mod sites;

use thiserror::Error;

pub use app_config::{AppConfig, SupabaseCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use meal::{MealType, WeekendPolicy};
pub use nutrition::{NutrientRecord, NutrientValue, Nutrition, RawMenuItem, NUTRITION_UNAVAILABLE};
pub use sites::{load_sites, SectionLayoutConfig, SiteConfig, SitesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[source] serde_yaml::Error),

    #[error("sites validation failed: {0}")]
    Validation(String),

    #[error("unknown site: {0}")]
    UnknownSite(String),
}
