// footprint_node/src/config.rs

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use footprint_core::config::FootprintConfig;
use serde::{Deserialize, Serialize};

use crate::error::NodeError;
use crate::serde_helpers;

/// Environment variables with this prefix override file values, with `__`
/// separating nested keys (`FOOTPRINT_FOOTPRINT__BASE_FRAME_ID=torso`).
pub const ENV_PREFIX: &str = "FOOTPRINT_";

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # NodeConfig
/// Everything the node reads at startup. Maps one-to-one onto the sections of
/// a `footprint.toml` file; every section may be omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct NodeConfig {
    /// Prefix applied to every frame name that is not fully qualified.
    pub tf_prefix: String,
    pub footprint: FootprintConfig,
    pub simulation: SimulationConfig,
    pub gait: GaitConfig,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SimulationConfig {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Duration of the run in simulated seconds.
    pub duration_seconds: f64,
    /// Rate of the joint-state trigger stream.
    pub joint_state_rate_hz: f64,
    /// How many ticks the transforms for a stamp lag behind its trigger.
    pub tf_latency_ticks: usize,
    /// Probability that a batch of transforms is lost in transit.
    pub dropout_probability: f64,
    /// Length of the transform history kept by the buffer.
    pub tf_cache_seconds: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 10.0,
            joint_state_rate_hz: 50.0,
            tf_latency_ticks: 2,
            dropout_probability: 0.0,
            tf_cache_seconds: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GaitConfig {
    /// Distance covered by one step, in metres.
    pub step_length: f64,
    /// Apex height of the swing foot, in metres.
    pub step_height: f64,
    /// Lateral distance between the feet, in metres.
    pub step_width: f64,
    /// Duration of a single step, in seconds.
    pub step_period: f64,
    /// Height of the base above the ground.
    pub torso_height: f64,
    /// Amplitude of the torso roll wobble (degrees in file).
    #[serde(with = "serde_helpers::radians_from_degrees")]
    pub torso_sway: f64,
    /// Constant heading rate (degrees per second in file).
    #[serde(with = "serde_helpers::radians_from_degrees")]
    pub turn_rate: f64,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            step_length: 0.04,
            step_height: 0.02,
            step_width: 0.1,
            step_period: 0.5,
            torso_height: 0.33,
            torso_sway: 3f64.to_radians(),
            turn_rate: 0.0,
        }
    }
}

// =========================================================================
// == Loading & Validation ==
// =========================================================================

impl NodeConfig {
    /// Defaults, then the TOML file (if any), then `FOOTPRINT_*` environment
    /// variables.
    pub fn load(path: Option<&Path>) -> Result<Self, NodeError> {
        let mut figment = Figment::from(Serialized::defaults(NodeConfig::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(NodeError::MissingConfig(path.to_path_buf()));
            }
            figment = figment.merge(Toml::file(path));
        }
        let config: NodeConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, NodeError> {
        let config: NodeConfig = Figment::from(Serialized::defaults(NodeConfig::default()))
            .merge(Toml::string(text))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        self.footprint.validate()?;

        let sim = &self.simulation;
        if !(sim.joint_state_rate_hz.is_finite() && sim.joint_state_rate_hz > 0.0) {
            return Err(NodeError::Invalid(format!(
                "simulation.joint_state_rate_hz must be positive, got {}",
                sim.joint_state_rate_hz
            )));
        }
        if !(sim.duration_seconds.is_finite() && sim.duration_seconds >= 0.0) {
            return Err(NodeError::Invalid(format!(
                "simulation.duration_seconds must be non-negative, got {}",
                sim.duration_seconds
            )));
        }
        if !(0.0..=1.0).contains(&sim.dropout_probability) {
            return Err(NodeError::Invalid(format!(
                "simulation.dropout_probability must be in [0, 1], got {}",
                sim.dropout_probability
            )));
        }
        if !(sim.tf_cache_seconds.is_finite() && sim.tf_cache_seconds > 0.0) {
            return Err(NodeError::Invalid(format!(
                "simulation.tf_cache_seconds must be positive, got {}",
                sim.tf_cache_seconds
            )));
        }
        if !(self.gait.step_period.is_finite() && self.gait.step_period > 0.0) {
            return Err(NodeError::Invalid(format!(
                "gait.step_period must be positive, got {}",
                self.gait.step_period
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = NodeConfig::from_toml_str("").unwrap();
        let defaults = NodeConfig::default();
        assert_eq!(config.footprint, defaults.footprint);
        assert_eq!(config.simulation, defaults.simulation);
        assert_eq!(config.footprint.queue_size, 50);
        assert!((config.gait.torso_sway - defaults.gait.torso_sway).abs() < 1e-12);
    }

    #[test]
    fn sections_override_defaults() {
        let config = NodeConfig::from_toml_str(
            r#"
            tf_prefix = "nao"

            [footprint]
            base_frame_id = "torso"

            [gait]
            turn_rate = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.tf_prefix, "nao");
        assert_eq!(config.footprint.base_frame_id, "torso");
        assert_eq!(config.footprint.odom_frame_id, "odom");
        assert!((config.gait.turn_rate - 10f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = NodeConfig::from_toml_str("[footprint]\nl_foot_frame_id = \"left\"\n");
        assert!(matches!(result, Err(NodeError::Config(_))));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let result = NodeConfig::from_toml_str("[simulation]\ndropout_probability = 1.5\n");
        assert!(matches!(result, Err(NodeError::Invalid(_))));

        let result = NodeConfig::from_toml_str("[footprint]\nqueue_size = 0\n");
        assert!(matches!(result, Err(NodeError::Footprint(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = NodeConfig::load(Some(Path::new("/nonexistent/footprint.toml")));
        assert!(matches!(result, Err(NodeError::MissingConfig(_))));
    }
}
