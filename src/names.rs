// src/names.rs

use anyhow::{Context, Result};
use std::{collections::HashMap, fs, path::Path};
use tracing::debug;

use crate::config::Config;

/// Source-specific spelling → canonical country name.
///
/// Lookups never fail: a label without an entry is already canonical.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    map: HashMap<String, String>,
}

impl NameTable {
    /// Load a flat JSON object (`{"raw": "canonical", ...}`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = fs::File::open(path)
            .with_context(|| format!("opening name table {}", path.display()))?;
        let map: HashMap<String, String> = serde_json::from_reader(f)
            .with_context(|| format!("parsing name table {}", path.display()))?;
        debug!(path = %path.display(), entries = map.len(), "loaded name table");
        Ok(Self { map })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            map: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn normalize<'a>(&'a self, raw: &'a str) -> &'a str {
        self.map.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The two tables, one per source that needs renaming. Kept apart because the
/// same raw spelling may map differently per source.
#[derive(Debug, Clone, Default)]
pub struct NameTables {
    pub ecdc: NameTable,
    pub ncov: NameTable,
}

impl NameTables {
    pub fn load(config: &Config) -> Result<Self> {
        Ok(Self {
            ecdc: NameTable::load(&config.ecdc_names)?,
            ncov: NameTable::load(&config.ncov_names)?,
        })
    }
}
