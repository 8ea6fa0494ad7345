use crate::adapters::http::DEFAULT_ENDPOINT;
use crate::core::session::{FetchPolicy, SessionOptions};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const API_KEY_ENV: &str = "QUOTE_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub category: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            category: None,
            timeout_seconds: None,
            headers: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
    pub in_memory: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "quotes.db".to_string(),
            in_memory: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub fetch_policy: FetchPolicy,
    pub surface_store_errors: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: bool,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after replacing `${VAR}` with environment values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    // Unset variables are left as written and rejected by validation.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            QuoteError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Falls back to `QUOTE_API_KEY` when no key is configured.
    pub fn with_env_api_key(mut self) -> Self {
        if self.source.api_key.is_none() {
            self.source.api_key = std::env::var(API_KEY_ENV).ok();
        }
        self
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;

        let api_key = validation::validate_required_field("source.api_key", &self.source.api_key)?;
        validation::validate_non_empty_string("source.api_key", api_key)?;
        if api_key.contains("${") {
            return Err(QuoteError::InvalidConfigValueError {
                field: "source.api_key".to_string(),
                value: api_key.clone(),
                reason: "Environment variable is not set".to_string(),
            });
        }

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 300)?;
        }

        if !self.store.in_memory {
            validation::validate_path("store.path", &self.store.path)?;
        }

        if let Some(level) = &self.logging.level {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level.as_str()) {
                return Err(QuoteError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            fetch_policy: self.session.fetch_policy,
            surface_store_errors: self.session.surface_store_errors,
            rng_seed: None,
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn api_key(&self) -> Option<&str> {
        self.source.api_key.as_deref()
    }

    fn category(&self) -> Option<&str> {
        self.source.category.as_deref()
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn extra_headers(&self) -> Option<&HashMap<String, String>> {
        self.source.headers.as_ref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
endpoint = "https://api.example.com/v1/quotes"
api_key = "abc123"
category = "inspirational"
timeout_seconds = 10

[source.headers]
User-Agent = "quote-gen"

[store]
path = "./data/quotes.db"

[session]
fetch_policy = "latest_only"
surface_store_errors = true

[logging]
level = "debug"
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_endpoint(), "https://api.example.com/v1/quotes");
        assert_eq!(config.api_key(), Some("abc123"));
        assert_eq!(config.category(), Some("inspirational"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(
            config.extra_headers().unwrap().get("User-Agent").map(String::as_str),
            Some("quote-gen")
        );
        assert_eq!(config.store.path, "./data/quotes.db");
        assert_eq!(config.session.fetch_policy, FetchPolicy::LatestOnly);
        assert!(config.session_options().surface_store_errors);
        assert!(config.logging.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.source.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.store.path, "quotes.db");
        assert!(!config.store.in_memory);
        assert_eq!(config.session.fetch_policy, FetchPolicy::Overlapping);
        assert!(matches!(
            config.validate(),
            Err(QuoteError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("QUOTE_GEN_TEST_KEY", "from-env");

        let config = TomlConfig::from_toml_str(
            r#"
[source]
api_key = "${QUOTE_GEN_TEST_KEY}"
"#,
        )
        .unwrap();
        assert_eq!(config.source.api_key.as_deref(), Some("from-env"));

        std::env::remove_var("QUOTE_GEN_TEST_KEY");
    }

    #[test]
    fn test_unresolved_placeholder_fails_validation() {
        let config = TomlConfig::from_toml_str(
            r#"
[source]
api_key = "${QUOTE_GEN_SURELY_UNSET_VAR}"
"#,
        )
        .unwrap();

        assert!(matches!(
            config.validate(),
            Err(QuoteError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let mut config = TomlConfig::from_toml_str(
            r#"
[source]
endpoint = "invalid-url"
api_key = "k"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        config.source.endpoint = DEFAULT_ENDPOINT.to_string();
        config.source.timeout_seconds = Some(0);
        assert!(config.validate().is_err());

        config.source.timeout_seconds = Some(5);
        config.logging.level = Some("loud".to_string());
        assert!(config.validate().is_err());

        config.logging.level = None;
        config.store.path = String::new();
        assert!(config.validate().is_err());

        config.store.in_memory = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\nin_memory = true\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert!(config.store.in_memory);
    }

    #[test]
    fn test_example_config_parses() {
        let config =
            TomlConfig::from_toml_str(include_str!("../../quote-gen.example.toml")).unwrap();

        assert_eq!(config.source.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.store.path, "./data/quotes.db");
        assert_eq!(config.session.fetch_policy, FetchPolicy::Overlapping);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            TomlConfig::from_toml_str("[source\nendpoint ="),
            Err(QuoteError::ConfigValidationError { .. })
        ));
    }
}
