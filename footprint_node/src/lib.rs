// footprint_node/src/lib.rs

// This module contains everything the binary wires together.
pub mod cli;
pub mod config;
pub mod error;
pub mod gait;
pub mod logging;
pub mod serde_helpers;
pub mod sim;

pub use config::NodeConfig;
pub use error::NodeError;
pub use sim::{RunSummary, Simulation};
