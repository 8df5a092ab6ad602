use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::controller::ControllerError;
use crate::serial::SerialError;

/// Errors surfaced by the flip-dot tools
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Serial port failure
    #[error("serial error: {0}")]
    Serial(#[from] SerialError),

    /// Controller rejected a request
    #[error("controller error: {0}")]
    Controller(#[from] ControllerError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Anything else
    #[error("{0}")]
    Other(String),
}

/// Result type for the flip-dot tools
pub type Result<T> = std::result::Result<T, Error>;
