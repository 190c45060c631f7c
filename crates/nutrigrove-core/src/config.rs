use crate::app_config::{AppConfig, SupabaseCredentials};
use crate::meal::WeekendPolicy;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every setting has a default, so an empty environment yields a usable
/// config with uploads disabled.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got '{other}'"))),
        }
    };

    let sites_path = PathBuf::from(or_default("NUTRIGROVE_SITES_PATH", "./config/sites.yaml"));
    let output_dir = PathBuf::from(or_default("NUTRIGROVE_OUTPUT_DIR", "./data"));
    let log_level = or_default("NUTRIGROVE_LOG_LEVEL", "info");

    let max_workers = parse_usize("NUTRIGROVE_MAX_WORKERS", "4")?;
    if max_workers == 0 {
        return Err(invalid(
            "NUTRIGROVE_MAX_WORKERS",
            "must be at least 1".to_string(),
        ));
    }

    let headless = parse_bool("NUTRIGROVE_HEADLESS", "true")?;
    let chrome_path = lookup("NUTRIGROVE_CHROME_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let page_settle_secs = parse_u64("NUTRIGROVE_PAGE_SETTLE_SECS", "15")?;
    let challenge_timeout_secs = parse_u64("NUTRIGROVE_CHALLENGE_TIMEOUT_SECS", "60")?;
    let popup_timeout_secs = parse_u64("NUTRIGROVE_POPUP_TIMEOUT_SECS", "5")?;
    let navigation_timeout_secs = parse_u64("NUTRIGROVE_NAVIGATION_TIMEOUT_SECS", "60")?;

    let weekend_policy = or_default("NUTRIGROVE_WEEKEND_POLICY", "brunch-as-breakfast")
        .parse::<WeekendPolicy>()
        .map_err(|reason| invalid("NUTRIGROVE_WEEKEND_POLICY", reason))?;

    let supabase = match (lookup("SUPABASE_URL"), lookup("SUPABASE_ANON_KEY")) {
        (Ok(url), Ok(anon_key)) if !url.trim().is_empty() && !anon_key.trim().is_empty() => {
            Some(SupabaseCredentials { url, anon_key })
        }
        _ => None,
    };

    let sink_timeout_secs = parse_u64("NUTRIGROVE_SINK_TIMEOUT_SECS", "30")?;
    let sink_max_retries = parse_u32("NUTRIGROVE_SINK_MAX_RETRIES", "3")?;
    let sink_backoff_base_ms = parse_u64("NUTRIGROVE_SINK_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        sites_path,
        output_dir,
        log_level,
        max_workers,
        headless,
        chrome_path,
        page_settle_secs,
        challenge_timeout_secs,
        popup_timeout_secs,
        navigation_timeout_secs,
        weekend_policy,
        supabase,
        sink_timeout_secs,
        sink_max_retries,
        sink_backoff_base_ms,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
