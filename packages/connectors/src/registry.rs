//! Connector registry
//!
//! The built-in registry is compiled from the tables under `connectors/` and
//! parsed on first use. Directories of tables can be loaded at runtime with
//! the same integrity checks.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::config;
use crate::connector::{Connector, ConnectorSummary};
use crate::error::{ConnectorError, Result};

const BUILTIN_TABLES: &[(&str, &str)] = &[
    ("ca_esun.yaml", include_str!("../connectors/ca_esun.yaml")),
    ("fl_fcic.yaml", include_str!("../connectors/fl_fcic.yaml")),
];

// Embedded tables are covered by the registry tests.
#[allow(clippy::expect_used, clippy::panic)]
static BUILTIN: LazyLock<ConnectorRegistry> = LazyLock::new(|| {
    let connectors = BUILTIN_TABLES
        .iter()
        .map(|(name, content)| {
            Connector::from_yaml_str(content)
                .unwrap_or_else(|e| panic!("built-in table {name} is invalid: {e}"))
        })
        .collect();
    ConnectorRegistry::new(connectors).expect("built-in connector ids are unique")
});

/// Named collection of connectors, in registration order.
#[derive(Debug, Clone)]
pub struct ConnectorRegistry {
    connectors: Vec<Connector>,
    index: HashMap<String, usize>,
}

impl ConnectorRegistry {
    /// Build a registry from already loaded connectors.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::DuplicateConnector` if two connectors share an id.
    pub fn new(connectors: Vec<Connector>) -> Result<Self> {
        let mut index = HashMap::with_capacity(connectors.len());
        for (i, connector) in connectors.iter().enumerate() {
            if index.insert(connector.id.clone(), i).is_some() {
                return Err(ConnectorError::DuplicateConnector(connector.id.clone()));
            }
        }
        Ok(Self { connectors, index })
    }

    /// The process-wide registry of built-in connectors.
    pub fn builtin() -> &'static ConnectorRegistry {
        &BUILTIN
    }

    /// Load every `*.yaml` table in `dir`, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, contains no tables,
    /// or any table fails to load.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        tracing::debug!(dir = %dir.display(), "Loading connector tables");

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "yaml"))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(ConnectorError::Load(format!(
                "no connector tables found in {}",
                dir.display()
            )));
        }

        let connectors = paths
            .iter()
            .map(|path| {
                Connector::from_yaml_file(path).map_err(|e| match e {
                    ConnectorError::Yaml(err) => {
                        ConnectorError::Load(format!("{}: {err}", path.display()))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(connectors)
    }

    pub fn lookup(&self, id: &str) -> Option<&Connector> {
        self.index.get(id).map(|&i| &self.connectors[i])
    }

    /// Summaries of all connectors in registration order.
    pub fn list_summaries(&self) -> Vec<ConnectorSummary> {
        self.connectors.iter().map(Connector::summary).collect()
    }

    /// The default connector, falling back to the first registered one
    /// when the registry was loaded without it.
    pub fn default_connector(&self) -> Option<&Connector> {
        self.lookup(config::DEFAULT_CONNECTOR_ID)
            .or_else(|| self.connectors.first())
    }

    pub fn connectors(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.iter()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}
