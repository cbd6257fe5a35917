//! Reference datasets for select fields
//!
//! Fields such as the plate type or vehicle make take their options from
//! external code lists (`platetype.csv`, `vehiclemake.csv`, ...). Each list
//! is a CSV file with a `value,label` header; further columns are ignored.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::config;
use crate::error::{ConnectorError, Result};
use crate::field::{FieldDefinition, OptionEntry, ValueSource};

/// Code lists keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct DatasetCatalog {
    datasets: BTreeMap<String, Vec<OptionEntry>>,
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.csv` file in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, a file exceeds
    /// [`config::MAX_DATASET_SIZE`], or a file is not a `value,label` CSV.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut catalog = Self::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || !path.extension().is_some_and(|ext| ext == "csv") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let size = fs::metadata(&path)?.len();
            if size > config::MAX_DATASET_SIZE {
                tracing::warn!(
                    dataset = name,
                    size,
                    max = config::MAX_DATASET_SIZE,
                    "Dataset exceeds size limit"
                );
                return Err(ConnectorError::Load(format!(
                    "dataset {name} exceeds maximum size limit ({} bytes)",
                    config::MAX_DATASET_SIZE
                )));
            }

            let entries = parse_csv(fs::File::open(&path)?)?;
            tracing::debug!(dataset = name, entries = entries.len(), "Loaded dataset");
            catalog.insert(name, entries);
        }

        Ok(catalog)
    }

    pub fn insert(&mut self, name: impl Into<String>, entries: Vec<OptionEntry>) {
        self.datasets.insert(name.into(), entries);
    }

    pub fn get(&self, name: &str) -> Option<&[OptionEntry]> {
        self.datasets.get(name).map(Vec::as_slice)
    }

    /// Options of a field: inline options, the named dataset, or none.
    ///
    /// A dataset that is not loaded resolves to no options.
    pub fn resolve<'a>(&'a self, def: &'a FieldDefinition) -> &'a [OptionEntry] {
        match def.value_source() {
            ValueSource::Inline(options) => options,
            ValueSource::Dataset(name) => self.get(name).unwrap_or_default(),
            ValueSource::Free => &[],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Parse `value,label` rows from a CSV reader.
///
/// # Errors
///
/// Returns `ConnectorError::Csv` on malformed rows or a missing column.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<OptionEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    reader
        .deserialize::<OptionEntry>()
        .map(|row| row.map_err(ConnectorError::from))
        .collect()
}
