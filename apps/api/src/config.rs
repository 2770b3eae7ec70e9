use std::time::Duration;

use anyhow::{Context, Result};

use crate::layout::{FontFamily, PageSize};

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Enables the remote compile stage when set.
    pub compile_service_url: Option<String>,
    pub compile_timeout: Duration,
    /// Enables the Postgres profile store when set.
    pub database_url: Option<String>,
    pub page_size: PageSize,
    pub font: FontFamily,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let page_size = match var("PAGE_SIZE") {
            Some(v) => PageSize::parse(&v).with_context(|| format!("PAGE_SIZE must be 'a4' or 'letter', got '{v}'"))?,
            None => PageSize::default(),
        };
        let font = match var("RENDER_FONT") {
            Some(v) => FontFamily::parse(&v)
                .with_context(|| format!("RENDER_FONT must be 'helvetica' or 'courier', got '{v}'"))?,
            None => FontFamily::default(),
        };

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            compile_service_url: var("COMPILE_SERVICE_URL"),
            compile_timeout: Duration::from_secs(
                var("COMPILE_TIMEOUT_SECS")
                    .unwrap_or_else(|| "15".to_string())
                    .parse::<u64>()
                    .context("COMPILE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            database_url: var("DATABASE_URL"),
            page_size,
            font,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.compile_timeout, Duration::from_secs(15));
        assert!(config.compile_service_url.is_none());
        assert!(config.database_url.is_none());
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.font, FontFamily::Helvetica);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "3000"),
            ("COMPILE_SERVICE_URL", "http://compiler:8000/compile"),
            ("COMPILE_TIMEOUT_SECS", "5"),
            ("PAGE_SIZE", "Letter"),
            ("RENDER_FONT", "courier"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.compile_service_url.as_deref(), Some("http://compiler:8000/compile"));
        assert_eq!(config.compile_timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, PageSize::Letter);
        assert_eq!(config.font, FontFamily::Courier);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("PAGE_SIZE", "legal")]).is_err());
        assert!(config_from(&[("RENDER_FONT", "comic")]).is_err());
        assert!(config_from(&[("COMPILE_TIMEOUT_SECS", "-1")]).is_err());
    }

    #[test]
    fn test_blank_values_treated_as_unset() {
        let config = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
    }
}
