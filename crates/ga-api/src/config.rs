//! Server configuration: optional YAML file plus environment overrides.
use ga_fetch::RetryPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Names the YAML config file.
pub const CONFIG_ENV: &str = "GA_CONFIG";
pub const ADDR_ENV: &str = "GA_ADDR";
pub const PROPERTY_ENV: &str = "GA_PROPERTY_ID";
pub const CREDENTIALS_ENV: &str = "GA_CREDENTIALS";
pub const GRAMMAR_ENV: &str = "GA_GRAMMAR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG/READ: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CONFIG/PARSE: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("CONFIG/GRAMMAR: {0}")]
    Grammar(#[from] ga_intent::GrammarError),

    #[error("CONFIG/INVALID: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub listen_addr: String,
    pub property_id: Option<String>,
    /// Path to a service-account `.json` file, or the JSON itself
    pub credentials: Option<String>,
    /// Intent grammar override; the built-in grammar otherwise
    pub grammar_path: Option<String>,
    pub retry: RetryPolicy,
    pub default_limit: u64,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8788".to_string(),
            property_id: None,
            credentials: None,
            grammar_path: None,
            retry: RetryPolicy::default(),
            default_limit: ga_core::DEFAULT_ROW_LIMIT,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// File named by `GA_CONFIG` (defaults if unset), then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_path(&path)?,
            Err(_) => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides from any key lookup; empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(addr) = get(ADDR_ENV) {
            self.listen_addr = addr;
        }
        if let Some(property) = get(PROPERTY_ENV) {
            self.property_id = Some(property);
        }
        if let Some(credentials) = get(CREDENTIALS_ENV) {
            self.credentials = Some(credentials);
        }
        if let Some(grammar) = get(GRAMMAR_ENV) {
            self.grammar_path = Some(grammar);
        }
        self
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
        }
        if self.default_limit == 0 || self.default_limit > ga_core::MAX_ROW_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "default_limit must be between 1 and {}",
                ga_core::MAX_ROW_LIMIT
            )));
        }
        Ok(())
    }

    /// Session to open at startup, when both halves are configured.
    pub fn startup_session(&self) -> Option<(&str, &str)> {
        Some((self.property_id.as_deref()?, self.credentials.as_deref()?))
    }

    pub fn grammar(&self) -> Result<ga_intent::Grammar, ConfigError> {
        match &self.grammar_path {
            Some(path) => Ok(ga_intent::Grammar::load(path)?),
            None => Ok(ga_intent::Grammar::builtin()),
        }
    }
}
