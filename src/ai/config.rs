//! Configuration: loads optional ~/.housegen/config.yaml.
//!
//! Every field has a default, so a partial file (or none at all) is fine.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{DecodeOptions, MissingTrack};

/// Environment variable that overrides `llm.api_key`.
pub const API_KEY_ENV: &str = "HOUSEGEN_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Chat-completions endpoint settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL.
    pub api_url: String,
    /// API key (secret).
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    pub temperature: f64,
    /// Request timeout; a timeout aborts assembly.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4".to_string(),
            temperature: 0.1,
            timeout_secs: 120,
        }
    }
}

/// Retry budget and decode tolerance for generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_attempts: u32,
    /// Automation samples per bar.
    pub values_per_bar: usize,
    pub missing_track: MissingTrack,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: super::DEFAULT_MAX_ATTEMPTS,
            values_per_bar: 4,
            missing_track: MissingTrack::Rest,
        }
    }
}

impl GenerationConfig {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new(self.missing_track)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Song record directory. Defaults to ~/.housegen/songs.
    pub dir: Option<PathBuf>,
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub generation: GenerationConfig,
    pub store: StoreConfig,
}

/// Get the default config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".housegen").join("config.yaml"))
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults. `HOUSEGEN_API_KEY` overrides the
    /// file's API key when set and non-empty.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => config_path(),
        };

        let config = match path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                debug!("loaded config from {}", path.display());
                Self::from_yaml_str(&content).map_err(|source| ConfigError::Yaml { path, source })?
            }
            _ => {
                debug!("no config file found, using defaults");
                Self::default()
            }
        };

        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.llm.api_key = key;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn default_config_has_no_key() {
        let config = Config::default();
        assert!(config.llm.api_key.is_empty());
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.generation.values_per_bar, 4);
        assert_eq!(config.store.dir, None);
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r#"
llm:
  api_url: https://example.test/v1
  api_key: sk-test-123
  model: gpt-4o
  temperature: 0.7
  timeout_secs: 30
generation:
  max_attempts: 5
  values_per_bar: 8
  missing_track: reject
store:
  dir: /tmp/songs
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_approx_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.generation.missing_track, MissingTrack::Reject);
        assert_eq!(config.store.dir, Some(PathBuf::from("/tmp/songs")));
    }

    #[test]
    fn partial_yaml_config() {
        let yaml = "generation:\n  values_per_bar: 2\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.generation.values_per_bar, 2);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.llm.timeout_secs, 120);
    }

    #[test]
    fn unknown_missing_track_policy_is_rejected() {
        assert!(Config::from_yaml_str("generation:\n  missing_track: guess\n").is_err());
    }

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.generation, GenerationConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "llm:\n  model: local-model\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.model, "local-model");
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "llm: [unclosed\n").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn api_key_override_ignores_blank_values() {
        let config = Config::default().with_api_key_override(Some("  ".to_string()));
        assert!(config.llm.api_key.is_empty());
        let config = Config::default().with_api_key_override(Some("sk-env".to_string()));
        assert_eq!(config.llm.api_key, "sk-env");
    }
}
