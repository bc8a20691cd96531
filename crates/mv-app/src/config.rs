use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GENERATOR_URL: &str = "http://127.0.0.1:5000/generate";
const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub generator_url: String,
    pub generator_timeout: Duration,
    pub provenance_url: Option<String>,
    pub provenance_api_key: Option<String>,
}

impl AppConfig {
    /// Read `.env` if present, then the process environment
    pub fn load() -> Result<Self, AppError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AppError::Config(format!(".env: {e}")));
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(non_empty("PORT"), "PORT", DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            non_empty("GENERATOR_TIMEOUT_SECS"),
            "GENERATOR_TIMEOUT_SECS",
            DEFAULT_GENERATOR_TIMEOUT_SECS,
        )?;

        Ok(Self {
            port,
            generator_url: non_empty("GENERATOR_URL")
                .unwrap_or_else(|| DEFAULT_GENERATOR_URL.to_string()),
            generator_timeout: Duration::from_secs(timeout_secs),
            provenance_url: non_empty("PROVENANCE_URL"),
            provenance_api_key: non_empty("PROVENANCE_API_KEY"),
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T, AppError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a number, got {value:?}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let conf = config(&[]).unwrap();
        assert_eq!(conf.port, DEFAULT_PORT);
        assert_eq!(conf.generator_url, DEFAULT_GENERATOR_URL);
        assert_eq!(conf.generator_timeout, Duration::from_secs(120));
        assert!(conf.provenance_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let conf = config(&[
            ("PORT", "9090"),
            ("GENERATOR_TIMEOUT_SECS", "30"),
            ("PROVENANCE_URL", "https://store.example/api"),
            ("PROVENANCE_API_KEY", ""),
        ])
        .unwrap();
        assert_eq!(conf.port, 9090);
        assert_eq!(conf.generator_timeout, Duration::from_secs(30));
        assert_eq!(conf.provenance_url.as_deref(), Some("https://store.example/api"));
        assert!(conf.provenance_api_key.is_none());
    }

    #[test]
    fn test_bad_port_is_an_error() {
        assert!(matches!(config(&[("PORT", "abc")]), Err(AppError::Config(_))));
    }
}
