use std::path::PathBuf;

use crate::meal::WeekendPolicy;

/// Connection details for the Supabase REST endpoint that receives cleaned
/// records. Absent when either `SUPABASE_URL` or `SUPABASE_ANON_KEY` is unset.
#[derive(Clone)]
pub struct SupabaseCredentials {
    pub url: String,
    pub anon_key: String,
}

impl std::fmt::Debug for SupabaseCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseCredentials")
            .field("url", &self.url)
            .field("anon_key", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub sites_path: PathBuf,
    pub output_dir: PathBuf,
    pub log_level: String,
    pub max_workers: usize,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub page_settle_secs: u64,
    pub challenge_timeout_secs: u64,
    pub popup_timeout_secs: u64,
    pub navigation_timeout_secs: u64,
    pub weekend_policy: WeekendPolicy,
    pub supabase: Option<SupabaseCredentials>,
    pub sink_timeout_secs: u64,
    pub sink_max_retries: u32,
    pub sink_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("sites_path", &self.sites_path)
            .field("output_dir", &self.output_dir)
            .field("log_level", &self.log_level)
            .field("max_workers", &self.max_workers)
            .field("headless", &self.headless)
            .field("chrome_path", &self.chrome_path)
            .field("page_settle_secs", &self.page_settle_secs)
            .field("challenge_timeout_secs", &self.challenge_timeout_secs)
            .field("popup_timeout_secs", &self.popup_timeout_secs)
            .field("navigation_timeout_secs", &self.navigation_timeout_secs)
            .field("weekend_policy", &self.weekend_policy)
            .field("supabase", &self.supabase)
            .field("sink_timeout_secs", &self.sink_timeout_secs)
            .field("sink_max_retries", &self.sink_max_retries)
            .field("sink_backoff_base_ms", &self.sink_backoff_base_ms)
            .finish()
    }
}
