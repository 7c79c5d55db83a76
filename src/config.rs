use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};
use tracing::warn;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,
    #[serde(default = "default_history_file")]
    pub history_file: String,
    /// Sessions longer than this are answered with a suggestion to split them.
    #[serde(default = "default_max_session_minutes")]
    pub max_session_minutes: u32,
    /// Mood confidence above which the acknowledgement is the emphatic one.
    #[serde(default = "default_high_confidence")]
    pub high_confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_seed: Option<u64>,
}

fn default_history_file() -> String {
    "datos_agente.json".to_string()
}

fn default_max_session_minutes() -> u32 {
    24 * 60
}

fn default_high_confidence() -> f32 {
    0.6
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("study-agent")
        });

        // Ensure data directory exists
        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")?;

        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config_str = std::fs::read_to_string(&config_path)
                .context("Failed to read config.json")?;

            if config_str.trim().is_empty() {
                warn!("Config file is empty, recreating defaults");
            } else {
                match serde_json::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        config.data_dir = data_dir;
                        config.validate()?;
                        return Ok(config);
                    }
                    Err(e) => {
                        warn!("Failed to parse existing config.json: {}", e);
                        warn!("Replacing it with defaults");
                    }
                }
            }
        }

        let config = Self::default_config(data_dir);
        config.save()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.data_dir.join(CONFIG_FILE);
        let json_str = serde_json::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(&config_path, json_str)
            .context("Failed to write config.json")?;
        Ok(())
    }

    fn default_config(data_dir: PathBuf) -> Self {
        Config {
            data_dir,
            history_file: default_history_file(),
            max_session_minutes: default_max_session_minutes(),
            high_confidence: default_high_confidence(),
            lexicon_path: None,
            tip_seed: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.history_file.trim().is_empty() {
            anyhow::bail!("history_file must not be empty");
        }
        if self.max_session_minutes == 0 {
            anyhow::bail!("max_session_minutes must be greater than zero");
        }
        if !(0.0..=1.0).contains(&self.high_confidence) {
            anyhow::bail!("high_confidence must be within 0.0-1.0, got {}", self.high_confidence);
        }
        Ok(())
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }

    pub fn shell_history_path(&self) -> PathBuf {
        self.data_dir.join("shell_history.txt")
    }

    /// Relative lexicon paths are resolved against the data directory.
    pub fn lexicon_path(&self) -> Option<PathBuf> {
        self.lexicon_path.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.data_dir.join(path)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();

        assert_eq!(config.history_file, "datos_agente.json");
        assert_eq!(config.max_session_minutes, 1440);
        assert!(dir.path().join("config.json").exists());
    }

    #[test]
    fn test_loads_partial_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{ "tip_seed": 7, "lexicon_path": "lexico.json" }"#,
        )
        .unwrap();

        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.tip_seed, Some(7));
        assert_eq!(config.high_confidence, 0.6);
        assert_eq!(config.lexicon_path(), Some(dir.path().join("lexico.json")));
    }

    #[test]
    fn test_corrupt_config_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();

        let config = Config::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.max_session_minutes, 1440);

        let rewritten = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert!(rewritten.contains("max_session_minutes"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{ "max_session_minutes": 0 }"#,
        )
        .unwrap();

        assert!(Config::new(Some(dir.path().to_path_buf())).is_err());
    }
}
