//! Environment configuration for the `usv` binary.
//!
//! | Variable            | Meaning                                          |
//! |---------------------|--------------------------------------------------|
//! | `USV_CONNECTOR_DIR` | Directory of connector tables replacing built-ins |
//! | `USV_DATASET_DIR`   | Directory of `value,label` CSV datasets           |
//! | `USV_DEFAULT_MODE`  | Jurisdiction mode when `--mode` is not given      |

use std::env;
use std::path::PathBuf;

use usv_connectors::{ConnectorRegistry, DatasetCatalog, JurisdictionMode};

use crate::error::{CliError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub connector_dir: Option<PathBuf>,
    pub dataset_dir: Option<PathBuf>,
    pub default_mode: JurisdictionMode,
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let default_mode = match non_empty("USV_DEFAULT_MODE") {
            Some(value) => value
                .parse()
                .map_err(|e| CliError::Config(format!("USV_DEFAULT_MODE: {e}")))?,
            None => JurisdictionMode::default(),
        };

        Ok(Self {
            connector_dir: non_empty("USV_CONNECTOR_DIR").map(PathBuf::from),
            dataset_dir: non_empty("USV_DATASET_DIR").map(PathBuf::from),
            default_mode,
        })
    }

    /// Load the connector registry from `connector_dir`.
    ///
    /// Returns `None` when the built-in registry should be used.
    pub fn load_registry(&self) -> Result<Option<ConnectorRegistry>> {
        self.connector_dir
            .as_ref()
            .map(ConnectorRegistry::from_dir)
            .transpose()
            .map_err(CliError::from)
    }

    /// Load datasets from `dataset_dir`, if configured.
    pub fn load_datasets(&self) -> Result<Option<DatasetCatalog>> {
        self.dataset_dir
            .as_ref()
            .map(DatasetCatalog::from_dir)
            .transpose()
            .map_err(CliError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<CliConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(config.load_registry().unwrap().is_none());
        assert!(config.load_datasets().unwrap().is_none());
    }

    #[test]
    fn test_reads_variables() {
        let config = config(&[
            ("USV_CONNECTOR_DIR", "/etc/usv/connectors"),
            ("USV_DATASET_DIR", "/etc/usv/data"),
            ("USV_DEFAULT_MODE", "out-of-state"),
        ])
        .unwrap();
        assert_eq!(config.connector_dir, Some(PathBuf::from("/etc/usv/connectors")));
        assert_eq!(config.dataset_dir, Some(PathBuf::from("/etc/usv/data")));
        assert_eq!(config.default_mode, JurisdictionMode::OutOfState);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config(&[("USV_CONNECTOR_DIR", " "), ("USV_DEFAULT_MODE", "")]).unwrap();
        assert!(config.connector_dir.is_none());
        assert_eq!(config.default_mode, JurisdictionMode::InState);
    }

    #[test]
    fn test_invalid_mode() {
        let err = config(&[("USV_DEFAULT_MODE", "sideways")]).unwrap_err();
        assert!(err.to_string().contains("USV_DEFAULT_MODE"), "{err}");
    }
}
