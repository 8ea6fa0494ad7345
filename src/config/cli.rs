use crate::config::toml_config::TomlConfig;
use crate::core::session::FetchPolicy;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "quote-gen")]
#[command(about = "Random quotes in random colors, with a saved list on disk")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Quote API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Quote API key (defaults to $QUOTE_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Only fetch quotes from this category
    #[arg(long)]
    pub category: Option<String>,

    /// SQLite file for saved quotes
    #[arg(long)]
    pub db: Option<String>,

    /// Keep saved quotes in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Apply only the most recently requested fetch
    #[arg(long)]
    pub latest_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the config file (if any), then applies command line and environment overrides.
    pub fn load(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config.with_env_api_key())
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.source.endpoint = endpoint.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.source.api_key = Some(api_key.clone());
        }
        if let Some(category) = &self.category {
            config.source.category = Some(category.clone());
        }
        if let Some(db) = &self.db {
            config.store.path = db.clone();
        }
        if self.ephemeral {
            config.store.in_memory = true;
        }
        if self.latest_only {
            config.session.fetch_policy = FetchPolicy::LatestOnly;
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}
