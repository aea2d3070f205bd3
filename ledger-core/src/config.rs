//! Configuration for the ledger

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the genesis file and the transaction log
    pub data_dir: PathBuf,

    /// Genesis file name, relative to `data_dir`
    pub genesis_file: String,

    /// Transaction log file name, relative to `data_dir`
    pub tx_log_file: String,

    /// How replay treats malformed or unappliable records
    pub replay: ReplayMode,

    /// fsync the log after every appended record
    pub sync_on_append: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./database"),
            genesis_file: "genesis.json".to_string(),
            tx_log_file: "tx.db".to_string(),
            replay: ReplayMode::Strict,
            sync_on_append: true,
        }
    }
}

/// Replay policy for records that fail to decode or apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayMode {
    /// Abort construction on the first bad record
    #[default]
    Strict,
    /// Skip bad records with a warning
    Tolerant,
}

impl Config {
    /// Config rooted at `data_dir` with default file names
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load from TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Full path of the genesis file
    pub fn genesis_path(&self) -> PathBuf {
        self.data_dir.join(&self.genesis_file)
    }

    /// Full path of the transaction log
    pub fn tx_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.tx_log_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.replay, ReplayMode::Strict);
        assert!(config.sync_on_append);
        assert_eq!(config.tx_log_path(), PathBuf::from("./database/tx.db"));
        assert_eq!(config.genesis_path(), PathBuf::from("./database/genesis.json"));
    }

    #[test]
    fn test_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dry.toml");
        std::fs::write(&path, "data_dir = \"/var/lib/dry\"\nreplay = \"tolerant\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/dry"));
        assert_eq!(config.replay, ReplayMode::Tolerant);
        assert_eq!(config.tx_log_file, "tx.db");
    }

    #[test]
    fn test_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dry.toml");
        std::fs::write(&path, "replay = \"lenient\"\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(crate::Error::Config(_))));
        assert!(matches!(
            Config::from_file(dir.path().join("missing.toml")),
            Err(crate::Error::Config(_))
        ));
    }
}
