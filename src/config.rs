//! Configuration management for game-caster-rs.
//!
//! Loads config from YAML files in standard locations; any missing section
//! or parse failure falls back to defaults with a warning.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum pending utterances; the least urgent entry is evicted when
    /// a more urgent one arrives at capacity.
    pub capacity: usize,
    /// Pause between consecutive utterances, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            debounce_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Upper bound on a single backend speak call, in seconds.
    pub speak_timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            speak_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SilenceConfig {
    /// Silence window length when no explicit duration is given.
    pub default_duration_secs: f64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            default_duration_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// "espeak" or "log"
    pub kind: String,
    pub espeak_binary: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: "espeak".into(),
            espeak_binary: "espeak".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub queue: QueueConfig,
    pub speech: SpeechConfig,
    pub silence: SilenceConfig,
    pub backend: BackendConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./config.yaml
    /// 2. ~/.config/game-caster/config.yaml
    /// 3. /etc/game-caster/config.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("config.yaml")),
                dirs::home_dir().map(|h| h.join(".config/game-caster/config.yaml")),
                Some(PathBuf::from("/etc/game-caster/config.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match serde_yml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", config_path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }
}
