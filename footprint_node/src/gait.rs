// footprint_node/src/gait.rs

//! A deterministic walking gait that stands in for odometry and forward
//! kinematics. It produces `odom -> base` and `base -> foot` poses for any
//! stamp, so the pipeline can be exercised without a robot.

use std::f64::consts::PI;

use footprint_core::config::FootprintFrames;
use footprint_core::types::{Pose, Stamp, StampedTransform};
use nalgebra::{Isometry3, Translation3, UnitQuaternion};

use crate::config::GaitConfig;

/// Vertical bob of the torso over one step, in metres.
const TORSO_BOB: f64 = 0.005;

/// The kinematic state of the walker at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaitSample {
    pub stamp: Stamp,
    pub odom_to_base: Pose,
    pub base_to_left: Pose,
    pub base_to_right: Pose,
}

impl GaitSample {
    /// The three edges a robot would broadcast for this instant.
    pub fn transforms(&self, frames: &FootprintFrames) -> [StampedTransform; 3] {
        [
            StampedTransform::new(
                frames.odom.clone(),
                frames.base.clone(),
                self.stamp,
                self.odom_to_base,
            ),
            StampedTransform::new(
                frames.base.clone(),
                frames.left_foot.clone(),
                self.stamp,
                self.base_to_left,
            ),
            StampedTransform::new(
                frames.base.clone(),
                frames.right_foot.clone(),
                self.stamp,
                self.base_to_right,
            ),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct GaitGenerator {
    config: GaitConfig,
}

impl GaitGenerator {
    pub fn new(config: GaitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GaitConfig {
        &self.config
    }

    fn speed(&self) -> f64 {
        self.config.step_length / self.config.step_period
    }

    /// The heading-only frame travelling along the walked path, on the ground.
    pub fn path_pose(&self, t: f64) -> Pose {
        let heading = self.config.turn_rate * t;
        let distance = self.speed() * t;

        // Straight line, or an arc of constant curvature.
        let (x, y) = if self.config.turn_rate.abs() < 1e-9 {
            (distance, 0.0)
        } else {
            let radius = self.speed() / self.config.turn_rate;
            (radius * heading.sin(), radius * (1.0 - heading.cos()))
        };

        Isometry3::from_parts(
            Translation3::new(x, y, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, heading),
        )
    }

    pub fn sample(&self, stamp: Stamp) -> GaitSample {
        let cfg = &self.config;
        let t = stamp.as_secs_f64();
        let phase = PI * t / cfg.step_period;
        let swing = phase.sin();

        // Left foot swings while `swing > 0`, right foot while `swing < 0`.
        let left_in_path = Isometry3::translation(
            0.5 * cfg.step_length * swing,
            0.5 * cfg.step_width,
            cfg.step_height * swing.max(0.0),
        );
        let right_in_path = Isometry3::translation(
            -0.5 * cfg.step_length * swing,
            -0.5 * cfg.step_width,
            cfg.step_height * (-swing).max(0.0),
        );

        // The torso leans over the stance foot and bobs twice per cycle.
        let base_in_path = Isometry3::from_parts(
            Translation3::new(
                0.0,
                -0.25 * cfg.step_width * swing,
                cfg.torso_height + TORSO_BOB * (2.0 * phase).cos(),
            ),
            UnitQuaternion::from_euler_angles(
                cfg.torso_sway * swing,
                0.5 * cfg.torso_sway * (2.0 * phase).sin(),
                0.0,
            ),
        );

        let path = self.path_pose(t);
        let odom_to_base = path * base_in_path;
        let base_from_path = base_in_path.inverse();

        GaitSample {
            stamp,
            odom_to_base,
            base_to_left: base_from_path * left_in_path,
            base_to_right: base_from_path * right_in_path,
        }
    }
}
