//! Configuration
//!
//! One flat record, loaded once at start-up from a YAML file. Every key is
//! optional; missing keys take the built-in defaults.

pub mod loader;
pub mod types;

pub use loader::ConfigError;
pub use types::*;
