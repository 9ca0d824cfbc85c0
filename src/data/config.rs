//! Balancing configuration: position templates per team size, attribute weights and search
//! limits. Read from YAML (or JSON, which YAML accepts) at `data/balance.yaml` unless
//! `FAIRPLAY_CONFIG` points elsewhere.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::balance::attributes::BalanceWeight;
use crate::balance::optimizer::{
    SearchLimits, DEFAULT_EARLY_EXIT_THRESHOLD, DEFAULT_MAX_ATTEMPTS, DEFAULT_RESHUFFLE_INTERVAL,
};
use crate::balance::template::{TemplateCatalog, TemplateEntry};
use crate::balance::SearchStrategy;
use crate::error::DataError;

pub const DEFAULT_CONFIG_PATH: &str = "data/balance.yaml";
pub const CONFIG_PATH_ENV: &str = "FAIRPLAY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    #[serde(alias = "maxAttempts")]
    pub max_attempts: usize,
    #[serde(alias = "earlyExitThreshold")]
    pub early_exit_threshold: f64,
    #[serde(alias = "reshuffleInterval")]
    pub reshuffle_interval: usize,
    #[serde(alias = "timeLimitMs")]
    pub time_limit_ms: Option<u64>,
    /// 0 keeps the search sequential; anything else runs that many parallel workers.
    pub workers: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            early_exit_threshold: DEFAULT_EARLY_EXIT_THRESHOLD,
            reshuffle_interval: DEFAULT_RESHUFFLE_INTERVAL,
            time_limit_ms: None,
            workers: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub templates: Vec<TemplateEntry>,
    pub weights: Vec<BalanceWeight>,
    pub search: SearchSettings,
}

impl BalanceConfig {
    pub fn catalog(&self) -> TemplateCatalog {
        TemplateCatalog::new(self.templates.clone())
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_attempts: self.search.max_attempts,
            early_exit_threshold: self.search.early_exit_threshold,
            reshuffle_interval: self.search.reshuffle_interval,
            time_limit: self.search.time_limit_ms.map(Duration::from_millis),
        }
    }

    pub fn strategy(&self) -> SearchStrategy {
        match self.search.workers {
            0 => SearchStrategy::Sequential,
            workers => SearchStrategy::Parallel { workers },
        }
    }
}

/// Path from `FAIRPLAY_CONFIG`, falling back to [DEFAULT_CONFIG_PATH].
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub fn parse_balance_config(raw: &str) -> Result<BalanceConfig, DataError> {
    Ok(serde_yaml::from_str(raw)?)
}

pub fn load_balance_config(path: &str) -> Result<BalanceConfig, DataError> {
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_balance_config(&raw)
}

/// Load config from `path`. Returns the built-in defaults if the file is missing or invalid.
pub fn load_balance_config_or_default(path: &str) -> BalanceConfig {
    if !Path::new(path).exists() {
        debug!(path, "no balance config found, using defaults");
        return BalanceConfig::default();
    }
    match load_balance_config(path) {
        Ok(config) => config,
        Err(err) => {
            warn!(path, error = %err, "ignoring unreadable balance config");
            BalanceConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::attributes::{Attribute, WeightGroup};
    use crate::balance::template::PositionTemplate;

    #[test]
    fn parses_templates_weights_and_search_settings() {
        let raw = r#"
templates:
  - team_size: 9
    defenders: 3
    midfielders: 4
    attackers: 2
weights:
  - positionGroup: team
    attribute: teamwork
    weight: 2.0
search:
  maxAttempts: 500
  time_limit_ms: 250
  workers: 3
"#;
        let config = parse_balance_config(raw).unwrap();
        assert_eq!(config.catalog().resolve(9), PositionTemplate::new(3, 4, 2));
        assert_eq!(config.weights[0].position_group, WeightGroup::Team);
        assert_eq!(config.weights[0].attribute, Attribute::Teamwork);

        let limits = config.limits();
        assert_eq!(limits.max_attempts, 500);
        assert_eq!(limits.reshuffle_interval, DEFAULT_RESHUFFLE_INTERVAL);
        assert_eq!(limits.time_limit, Some(Duration::from_millis(250)));
        assert_eq!(config.strategy(), SearchStrategy::Parallel { workers: 3 });
    }

    #[test]
    fn empty_document_means_defaults() {
        let config = parse_balance_config("{}").unwrap();
        assert_eq!(config, BalanceConfig::default());
        assert_eq!(config.limits(), SearchLimits::default());
        assert_eq!(config.strategy(), SearchStrategy::Sequential);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_balance_config_or_default("/definitely/not/here/balance.yaml");
        assert_eq!(config, BalanceConfig::default());
    }

    #[test]
    fn strict_load_reports_missing_file() {
        assert!(matches!(
            load_balance_config("/definitely/not/here/balance.yaml"),
            Err(DataError::Io { .. })
        ));
    }
}
