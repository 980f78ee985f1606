use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::index::TrendThresholds;
use crate::core::rates::DEFAULT_RATE_ID;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DolarApiProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SupabaseProviderConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub dolarapi: Option<DolarApiProviderConfig>,
    /// When absent, the built-in fixture catalog is used.
    pub supabase: Option<SupabaseProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            dolarapi: Some(DolarApiProviderConfig {
                base_url: "https://dolarapi.com".to_string(),
            }),
            supabase: None,
        }
    }
}

fn default_rate() -> String {
    DEFAULT_RATE_ID.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Rate regime used when the CLI does not override it.
    #[serde(default = "default_rate")]
    pub default_rate: String,
    #[serde(default)]
    pub trend: TrendThresholds,
    /// Moderation queue location; defaults to the config directory.
    #[serde(default)]
    pub contributions_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            default_rate: default_rate(),
            trend: TrendThresholds::default(),
            contributions_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Resolves the contributions file: explicit config entry or the
    /// default location beside the config file.
    pub fn contributions_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.contributions_path {
            return Ok(path.clone());
        }
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.config_dir().join("contributions.yaml"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("ar", "carodolar", "carodolar")
            .context("Could not determine project directories")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
providers:
  dolarapi:
    base_url: "http://example.com/dolarapi"
  supabase:
    base_url: "http://example.com/supabase"
    api_key: "service-key"
default_rate: "mep"
trend:
  up: 10.0
  down: -10.0
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.providers.dolarapi.unwrap().base_url,
            "http://example.com/dolarapi"
        );
        let supabase = config.providers.supabase.unwrap();
        assert_eq!(supabase.base_url, "http://example.com/supabase");
        assert_eq!(supabase.api_key, "service-key");
        assert_eq!(config.default_rate, "mep");
        assert_eq!(config.trend.up, 10.0);
        assert_eq!(config.trend.down, -10.0);
        assert_eq!(config.contributions_path, None);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config.default_rate, "blue");
        assert_eq!(config.trend, TrendThresholds::default());
        assert_eq!(
            config.providers.dolarapi.unwrap().base_url,
            "https://dolarapi.com"
        );
        assert!(config.providers.supabase.is_none());
    }

    #[test]
    fn test_explicit_contributions_path() {
        let yaml_str = r#"
contributions_path: "/tmp/queue.yaml"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(
            config.contributions_path().unwrap(),
            PathBuf::from("/tmp/queue.yaml")
        );
    }
}
