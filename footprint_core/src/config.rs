// footprint_core/src/config.rs

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::FrameId;

/// Left foot frame. Not configurable.
pub const LEFT_FOOT_FRAME: &str = "l_sole";
/// Right foot frame. Not configurable.
pub const RIGHT_FOOT_FRAME: &str = "r_sole";
/// Depth of the trigger subscription and of the synchronizer queue.
pub const DEFAULT_QUEUE_SIZE: usize = 50;

// =========================================================================
// == Footprint Configuration ==
// =========================================================================

/// # FootprintConfig
/// The recognised options of the footprint publisher. Every field has a
/// default, so an empty `[footprint]` table is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FootprintConfig {
    pub odom_frame_id: String,
    pub base_frame_id: String,
    pub base_footprint_frame_id: String,
    /// Maximum number of triggers waiting for their transforms.
    pub queue_size: usize,
    /// Wait until both feet and the base are available before computing.
    /// When false, only the right foot is waited on and the remaining lookups
    /// are assumed to be available at the same time.
    pub wait_on_all_frames: bool,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            odom_frame_id: "odom".to_string(),
            base_frame_id: "base_link".to_string(),
            base_footprint_frame_id: "base_footprint".to_string(),
            queue_size: DEFAULT_QUEUE_SIZE,
            wait_on_all_frames: true,
        }
    }
}

impl FootprintConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_size == 0 {
            return Err(ConfigError::ZeroQueueSize);
        }
        for (key, value) in [
            ("odom_frame_id", &self.odom_frame_id),
            ("base_frame_id", &self.base_frame_id),
            ("base_footprint_frame_id", &self.base_footprint_frame_id),
        ] {
            if value.trim_matches('/').is_empty() {
                return Err(ConfigError::EmptyFrameId(key));
            }
        }
        Ok(())
    }
}

// =========================================================================
// == Resolved Frame Names ==
// =========================================================================

/// Applies a tf prefix to a frame name.
///
/// A leading `/` marks a fully qualified name: the prefix is not applied and
/// the slash is stripped. An empty prefix leaves the name untouched.
pub fn resolve_frame(prefix: &str, name: &str) -> FrameId {
    if let Some(qualified) = name.strip_prefix('/') {
        return FrameId::new(qualified);
    }
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        FrameId::new(name)
    } else {
        FrameId::new(format!("{prefix}/{name}"))
    }
}

/// The five frames the pipeline works with, after prefix resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootprintFrames {
    pub odom: FrameId,
    pub base: FrameId,
    pub footprint: FrameId,
    pub left_foot: FrameId,
    pub right_foot: FrameId,
}

impl Default for FootprintFrames {
    fn default() -> Self {
        Self::resolve(&FootprintConfig::default(), "")
    }
}

impl FootprintFrames {
    pub fn resolve(config: &FootprintConfig, tf_prefix: &str) -> Self {
        Self {
            odom: resolve_frame(tf_prefix, &config.odom_frame_id),
            base: resolve_frame(tf_prefix, &config.base_frame_id),
            footprint: resolve_frame(tf_prefix, &config.base_footprint_frame_id),
            left_foot: resolve_frame(tf_prefix, LEFT_FOOT_FRAME),
            right_foot: resolve_frame(tf_prefix, RIGHT_FOOT_FRAME),
        }
    }

    /// Rejects configurations where two roles share a frame, which would make
    /// the published edge a self-loop or overwrite one of its own inputs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let roles = [
            &self.odom,
            &self.base,
            &self.footprint,
            &self.left_foot,
            &self.right_foot,
        ];
        for (i, a) in roles.iter().enumerate() {
            if let Some(b) = roles[i + 1..].iter().find(|b| **b == *a) {
                return Err(ConfigError::DuplicateFrame((*a).clone(), (*b).clone()));
            }
        }
        Ok(())
    }

    /// Frames that must be resolvable in `odom` before a trigger is ready.
    pub fn required(&self, wait_on_all_frames: bool) -> Vec<FrameId> {
        if wait_on_all_frames {
            vec![
                self.left_foot.clone(),
                self.right_foot.clone(),
                self.base.clone(),
            ]
        } else {
            vec![self.right_foot.clone()]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventional_frame_names() {
        let config = FootprintConfig::default();
        assert_eq!(config.odom_frame_id, "odom");
        assert_eq!(config.base_frame_id, "base_link");
        assert_eq!(config.base_footprint_frame_id, "base_footprint");
        assert_eq!(config.queue_size, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_queue_and_empty_frames() {
        let mut config = FootprintConfig {
            queue_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroQueueSize));

        config.queue_size = 10;
        config.base_frame_id = "/".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyFrameId("base_frame_id"))
        );
    }

    #[test]
    fn prefix_resolution() {
        assert_eq!(resolve_frame("", "odom"), FrameId::from("odom"));
        assert_eq!(resolve_frame("nao", "odom"), FrameId::from("nao/odom"));
        assert_eq!(resolve_frame("/nao/", "l_sole"), FrameId::from("nao/l_sole"));
        assert_eq!(resolve_frame("nao", "/map"), FrameId::from("map"));
    }

    #[test]
    fn resolved_frames_carry_prefix() {
        let frames = FootprintFrames::resolve(&FootprintConfig::default(), "robot1");
        assert_eq!(frames.odom, FrameId::from("robot1/odom"));
        assert_eq!(frames.right_foot, FrameId::from("robot1/r_sole"));
        assert!(frames.validate().is_ok());
    }

    #[test]
    fn duplicate_roles_are_rejected() {
        let config = FootprintConfig {
            base_footprint_frame_id: "base_link".to_string(),
            ..Default::default()
        };
        let frames = FootprintFrames::resolve(&config, "");
        assert_eq!(
            frames.validate(),
            Err(ConfigError::DuplicateFrame(
                FrameId::from("base_link"),
                FrameId::from("base_link")
            ))
        );
    }

    #[test]
    fn required_frames_policy() {
        let frames = FootprintFrames::default();
        assert_eq!(frames.required(true).len(), 3);
        assert_eq!(frames.required(false), vec![FrameId::from("r_sole")]);
    }
}
