// footprint_node/src/error.rs

use std::path::PathBuf;

use footprint_core::error::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config file {0} does not exist")]
    MissingConfig(PathBuf),

    #[error("failed to load configuration: {0}")]
    Config(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid footprint configuration: {0}")]
    Footprint(#[from] ConfigError),

    #[error("failed to write configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}
