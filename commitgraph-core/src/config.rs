use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::CoreError;

/// Service configuration, read from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `<project>/<slug>` repositories
    pub repositories_root: PathBuf,
    /// Page size used when a request names none
    pub page_size: usize,
    /// Largest page size a request may ask for
    pub max_page_size: usize,
    /// Reason recorded for each elevated changeset read
    pub elevation_reason: String,
    /// Default log level for the command line tool
    pub log_level: String,
    /// Known user names; empty means any name resolves
    pub users: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repositories_root: PathBuf::from("."),
            page_size: 50,
            max_page_size: 500,
            elevation_reason: "Reading repository changesets".to_string(),
            log_level: "warn".to_string(),
            users: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, else `commitgraph.toml` in the working
    /// directory if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, CoreError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new("commitgraph.toml");
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_page_size == 0 {
            return Err(CoreError::InvalidConfig("max_page_size must be positive".into()));
        }
        if self.page_size == 0 || self.page_size > self.max_page_size {
            return Err(CoreError::InvalidConfig(format!(
                "page_size must be between 1 and {}",
                self.max_page_size
            )));
        }
        Ok(())
    }
}
