//! Configuration loading
//!
//! Reads the YAML file and validates the result. A missing file is not an
//! error for `load_or_default`; the tools then run on built-in defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use flipdot_protocol::frame::{MAX_ADDRESS, MAX_IMAGE_BYTES};

use super::types::Config;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read
    #[error("error reading config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File is not valid YAML for `Config`
    #[error("error parsing config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

impl Config {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigError> {
        // An empty document is valid and means "all defaults"
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load a YAML file, falling back to defaults when it does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::load(path) {
            Err(ConfigError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                warn!("{} not found, using built-in defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::Invalid("columns and rows must be non-zero"));
        }
        if self.image_bytes() > MAX_IMAGE_BYTES {
            return Err(ConfigError::Invalid(
                "sign too large: columns * ceil(rows / 8) must not exceed 255 image bytes",
            ));
        }
        if self.address > MAX_ADDRESS {
            return Err(ConfigError::Invalid("address must be between 0 and 15"));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be non-zero"));
        }
        if self.test_packet.is_empty() {
            return Err(ConfigError::Invalid("test_packet must not be empty"));
        }
        if self.history_len == 0 {
            return Err(ConfigError::Invalid("history_len must be non-zero"));
        }
        Ok(())
    }
}
