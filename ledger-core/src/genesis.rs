//! Genesis balances

use crate::{types::Account, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Seed balances applied before any log replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Initial balance per account
    pub balances: BTreeMap<Account, u64>,
}

impl Genesis {
    /// Load from a JSON file shaped as `{"balances": {"account": amount}}`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| {
            Error::Config(format!("Failed to read genesis {}: {}", path.display(), e))
        })?;
        let genesis: Genesis = serde_json::from_slice(&content).map_err(|e| {
            Error::Config(format!("Failed to parse genesis {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            accounts = genesis.balances.len(),
            "Genesis loaded"
        );

        Ok(genesis)
    }

    /// Sum of all seed balances
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|v| *v as u128).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_genesis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genesis.json");
        fs::write(
            &path,
            r#"{"genesis_time":"2019-03-18T00:00:00Z","balances":{"andrej":1000000,"babayaga":0}}"#,
        )
        .unwrap();

        let genesis = Genesis::load(&path).unwrap();
        assert_eq!(genesis.balances.len(), 2);
        assert_eq!(genesis.balances[&Account::new("andrej")], 1_000_000);
        assert_eq!(genesis.total_supply(), 1_000_000);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Genesis::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_balances_are_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genesis.json");

        fs::write(&path, r#"{"balances":{"andrej":-5}}"#).unwrap();
        assert!(matches!(Genesis::load(&path), Err(Error::Config(_))));

        fs::write(&path, r#"{"accounts":{}}"#).unwrap();
        assert!(matches!(Genesis::load(&path), Err(Error::Config(_))));

        fs::write(&path, "balances = 5").unwrap();
        assert!(matches!(Genesis::load(&path), Err(Error::Config(_))));
    }
}
