use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;

use crate::cache::DEFAULT_TTL_SECS;
use crate::error::AppError;
use crate::retry::RetryPolicy;

pub const DEFAULT_STOREFRONT_URL: &str = "https://play.google.com/store/apps/details";

/// Settings shared by the fetcher, retry policy, and cache.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    /// Listing page URL; the identifier goes into its `id` query parameter.
    pub storefront_url: String,
    /// `hl` query parameter
    pub locale: String,
    /// `gl` query parameter
    pub country: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub cache_ttl: TimeDelta,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            storefront_url: DEFAULT_STOREFRONT_URL.to_string(),
            locale: "en_US".to_string(),
            country: "US".to_string(),
            timeout: Duration::from_secs(3),
            retry: RetryPolicy::default(),
            cache_ttl: TimeDelta::seconds(DEFAULT_TTL_SECS),
        }
    }
}

impl LookupConfig {
    /// Read configuration from environment variables, falling back to defaults.
    ///
    /// - `APPSCOPE_STOREFRONT_URL`
    /// - `APPSCOPE_LOCALE`, `APPSCOPE_COUNTRY`
    /// - `APPSCOPE_TIMEOUT_SECS` (at least 1)
    /// - `APPSCOPE_MAX_ATTEMPTS` (at least 1)
    /// - `APPSCOPE_RETRY_DELAY_MS`
    /// - `APPSCOPE_CACHE_TTL_SECS` (at least 1)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let timeout_secs: u64 =
            parse_var(&lookup, "APPSCOPE_TIMEOUT_SECS", defaults.timeout.as_secs(), 1)?;
        let max_attempts: u32 = parse_var(
            &lookup,
            "APPSCOPE_MAX_ATTEMPTS",
            defaults.retry.max_attempts,
            1,
        )?;
        let retry_delay_ms: u64 = parse_var(
            &lookup,
            "APPSCOPE_RETRY_DELAY_MS",
            defaults.retry.delay.as_millis() as u64,
            0,
        )?;
        let ttl_secs: i64 = parse_var(
            &lookup,
            "APPSCOPE_CACHE_TTL_SECS",
            defaults.cache_ttl.num_seconds(),
            1,
        )?;

        let cache_ttl = TimeDelta::try_seconds(ttl_secs).ok_or_else(|| {
            AppError::ConfigError(format!(
                "APPSCOPE_CACHE_TTL_SECS '{ttl_secs}' is out of range"
            ))
        })?;

        Ok(Self {
            storefront_url: lookup("APPSCOPE_STOREFRONT_URL").unwrap_or(defaults.storefront_url),
            locale: lookup("APPSCOPE_LOCALE").unwrap_or(defaults.locale),
            country: lookup("APPSCOPE_COUNTRY").unwrap_or(defaults.country),
            timeout: Duration::from_secs(timeout_secs),
            retry: RetryPolicy::new(max_attempts, Duration::from_millis(retry_delay_ms)),
            cache_ttl,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    min: T,
) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let parsed: T = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!("Invalid {key} '{raw}': must be an integer"))
    })?;
    if parsed < min {
        return Err(AppError::ConfigError(format!(
            "{key} must be at least {min}"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_map(vars: &[(&str, &str)]) -> Result<LookupConfig, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LookupConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, LookupConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay, Duration::from_secs(1));
        assert_eq!(config.cache_ttl, TimeDelta::hours(6));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = from_map(&[
            ("APPSCOPE_LOCALE", "de_DE"),
            ("APPSCOPE_COUNTRY", "DE"),
            ("APPSCOPE_TIMEOUT_SECS", "10"),
            ("APPSCOPE_MAX_ATTEMPTS", "5"),
            ("APPSCOPE_RETRY_DELAY_MS", "250"),
            ("APPSCOPE_CACHE_TTL_SECS", "60"),
        ])
        .unwrap();
        assert_eq!(config.locale, "de_DE");
        assert_eq!(config.country, "DE");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.retry, RetryPolicy::new(5, Duration::from_millis(250)));
        assert_eq!(config.cache_ttl, TimeDelta::seconds(60));
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let err = from_map(&[("APPSCOPE_TIMEOUT_SECS", "fast")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("APPSCOPE_TIMEOUT_SECS"));
    }

    #[test]
    fn test_values_below_minimum_are_rejected() {
        assert!(from_map(&[("APPSCOPE_MAX_ATTEMPTS", "0")]).is_err());
        assert!(from_map(&[("APPSCOPE_CACHE_TTL_SECS", "0")]).is_err());
        assert!(from_map(&[("APPSCOPE_RETRY_DELAY_MS", "0")]).is_ok());
    }

    #[test]
    fn test_out_of_range_ttl_is_a_config_error() {
        let err = from_map(&[("APPSCOPE_CACHE_TTL_SECS", "9223372036854775807")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
