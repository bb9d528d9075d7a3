use crate::app_config::{AppConfig, Environment};
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
/// development config. The AI key is the only optional value; without it the
/// AI-assisted analysis step is skipped.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("REVDASH_ENV", "development"))?;
    let bind_addr = parse_addr("REVDASH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("REVDASH_LOG_LEVEL", "info");

    let scraper_request_timeout_secs = parse_u64("REVDASH_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default(
        "REVDASH_SCRAPER_USER_AGENT",
        "revdash/0.1 (review-analytics)",
    );
    let scraper_max_retries = parse_u32("REVDASH_SCRAPER_MAX_RETRIES", "3")?;
    let scraper_retry_backoff_base_ms = parse_u64("REVDASH_SCRAPER_RETRY_BACKOFF_BASE_MS", "1000")?;
    let scraper_inter_request_delay_ms = parse_u64("REVDASH_SCRAPER_INTER_REQUEST_DELAY_MS", "250")?;
    let max_reviews_per_store = parse_positive_usize("REVDASH_MAX_REVIEWS_PER_STORE", "100")?;

    let play_lang = or_default("REVDASH_PLAY_LANG", "ru");
    let play_country = or_default("REVDASH_PLAY_COUNTRY", "ru");
    let app_store_country = or_default("REVDASH_APP_STORE_COUNTRY", "ru");
    let play_base_url = or_default("REVDASH_PLAY_BASE_URL", "https://play.google.com");
    let app_store_base_url = or_default("REVDASH_APP_STORE_BASE_URL", "https://itunes.apple.com");

    let deepseek_api_key = lookup("DEEPSEEK_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let deepseek_api_url = or_default(
        "DEEPSEEK_API_URL",
        "https://api.deepseek.com/v1/chat/completions",
    );
    let deepseek_model = or_default("DEEPSEEK_MODEL", "deepseek-chat");
    let ai_batch_size = parse_positive_usize("REVDASH_AI_BATCH_SIZE", "5")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_ms,
        scraper_inter_request_delay_ms,
        max_reviews_per_store,
        play_lang,
        play_country,
        app_store_country,
        play_base_url,
        app_store_base_url,
        deepseek_api_key,
        deepseek_api_url,
        deepseek_model,
        ai_batch_size,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVDASH_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
