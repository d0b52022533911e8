use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_BASE_URL: &str = "https://petstore.swagger.io/v2";
pub const DEFAULT_API_KEY: &str = "test_key_corti";

pub const BASE_URL_ENV: &str = "PETSTORE_BASE_URL";
pub const API_KEY_ENV: &str = "PETSTORE_API_KEY";

#[derive(Debug, Clone, Parser)]
#[command(name = "petstore-suite")]
#[command(about = "Runs the verified pet-store API cases against a live service")]
pub struct SuiteConfig {
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = API_KEY_ENV, default_value = DEFAULT_API_KEY)]
    pub api_key: String,

    #[arg(long, help = "JSON file of cases to run instead of the built-in suite")]
    pub cases: Option<PathBuf>,

    #[arg(long, help = "Only run cases whose name contains this text")]
    pub filter: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            cases: None,
            filter: None,
            verbose: false,
        }
    }
}

impl SuiteConfig {
    /// Defaults overridden by `PETSTORE_BASE_URL` and `PETSTORE_API_KEY`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            config.api_key = api_key;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_service() {
        let config = SuiteConfig::default();
        assert_eq!(config.base_url, "https://petstore.swagger.io/v2");
        assert_eq!(config.api_key, "test_key_corti");
        assert!(!config.verbose);
    }

    #[test]
    fn flags_override_defaults() {
        let config = SuiteConfig::try_parse_from([
            "petstore-suite",
            "--base-url",
            "http://127.0.0.1:3000",
            "--filter",
            "delete_pet",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:3000");
        assert_eq!(config.filter.as_deref(), Some("delete_pet"));
        assert!(config.verbose);
        assert!(config.cases.is_none());
    }
}
