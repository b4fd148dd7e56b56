// src/config.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;
use url::Url;

use crate::error::ScrapeError;

/// Looked up in the working directory; optional.
pub const DEFAULT_CONFIG_FILE: &str = "covidscraper.yaml";

const WORLDOMETERS_URL: &str = "https://www.worldometers.info/coronavirus/";
const WORLDOMETERS_USA_URL: &str = "https://www.worldometers.info/coronavirus/country/us/";
const ECDC_URL: &str = "https://opendata.ecdc.europa.eu/covid19/casedistribution/json/";
const NCOV_URL: &str = "https://ncov2019.live/data";

/// Run settings. Every field has a default, so a config file only needs the
/// keys it overrides.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub worldometers_url: String,
    pub worldometers_usa_url: String,
    pub ecdc_url: String,
    pub ncov_url: String,
    /// Name table applied to ECDC country labels.
    pub ecdc_names: PathBuf,
    /// Name table applied to nCov2019 country labels.
    pub ncov_names: PathBuf,
    /// Overwritten on every run.
    pub output: PathBuf,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worldometers_url: WORLDOMETERS_URL.to_string(),
            worldometers_usa_url: WORLDOMETERS_USA_URL.to_string(),
            ecdc_url: ECDC_URL.to_string(),
            ncov_url: NCOV_URL.to_string(),
            ecdc_names: PathBuf::from("data/ecdc_names.json"),
            ncov_names: PathBuf::from("data/ncov_names.json"),
            output: PathBuf::from("COVID19.xlsx"),
            timeout_secs: 60,
            user_agent: concat!("covidscraper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Parse a YAML config file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Use `path` when it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!(path = %path.display(), "loading config");
            Self::load(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn validate(&self) -> Result<(), ScrapeError> {
        for (field, value) in [
            ("worldometers_url", &self.worldometers_url),
            ("worldometers_usa_url", &self.worldometers_usa_url),
            ("ecdc_url", &self.ecdc_url),
            ("ncov_url", &self.ncov_url),
        ] {
            Url::parse(value).map_err(|e| ScrapeError::InvalidConfig {
                field,
                reason: format!("{:?}: {}", value, e),
            })?;
        }
        if self.output.as_os_str().is_empty() {
            return Err(ScrapeError::InvalidConfig {
                field: "output",
                reason: "empty path".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ScrapeError::InvalidConfig {
                field: "timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
