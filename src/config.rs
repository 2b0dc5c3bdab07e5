use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Deserialize;

use crate::data::loader::{Encoding, LoadOptions, ParsePolicy, DEFAULT_DATE_FORMATS};
use crate::data::options::OptionCatalog;
use crate::error::ConfigError;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub filters: FiltersConfig,
    /// Directory of the file this config was read from.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    /// Dataset opened when none is given explicitly. Relative paths resolve
    /// against the config file's directory.
    pub default_path: Option<PathBuf>,
    pub delimiter: char,
    pub encoding: Encoding,
    pub date_formats: Vec<String>,
    pub on_parse_error: ParsePolicy,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            default_path: None,
            delimiter: ',',
            encoding: Encoding::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            on_parse_error: ParsePolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FiltersConfig {
    pub catalog: OptionCatalog,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[dataset]
delimiter = ","
encoding = "auto"
date_formats = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%d/%m/%Y"]
on_parse_error = "reject"

[filters]
catalog = "dataset"
"#;

/// Load configuration.
///
/// Search order:
/// 1. The explicitly given file
/// 2. `config.toml` next to the executable
/// 3. Falls back to embedded default config
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        info!("Loading config from: {}", path.display());
        return Config::from_file(path);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                info!("Loading config from: {}", config_path.display());
                return Config::from_file(&config_path);
            } else {
                warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    info!("Using default embedded configuration");
    Config::parse(DEFAULT_CONFIG)
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&contents)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// The configured default dataset, resolved to a usable path.
    pub fn dataset_path(&self) -> Option<PathBuf> {
        let path = self.dataset.default_path.as_ref()?;
        match &self.base_dir {
            Some(base) if path.is_relative() => Some(base.join(path)),
            _ => Some(path.clone()),
        }
    }

    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        let delimiter = self.dataset.delimiter;
        if !delimiter.is_ascii() {
            return Err(ConfigError::InvalidDelimiter(delimiter));
        }
        Ok(LoadOptions {
            delimiter: delimiter as u8,
            encoding: self.dataset.encoding,
            date_formats: self.dataset.date_formats.clone(),
            policy: self.dataset.on_parse_error,
        })
    }
}
