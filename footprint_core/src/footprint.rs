// footprint_core/src/footprint.rs

//! The footprint geometry.
//!
//! Given the poses of both feet and of the base in a common frame (odom), the
//! footprint is a ground-plane frame that:
//! - sits at the horizontal midpoint between the feet,
//! - takes the height of the lower foot,
//! - shares the base's heading (yaw) but has zero roll and pitch.
//!
//! It is published relative to the base, so the result is
//! `base -> footprint = (odom -> base)^-1 * (odom -> footprint)`.

use nalgebra::{Isometry3, Translation3, UnitQuaternion};

use crate::types::Pose;

/// The three poses a footprint is computed from, all relative to odom and all
/// valid at the same time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintInputs {
    pub left_foot: Pose,
    pub right_foot: Pose,
    pub base: Pose,
}

impl FootprintInputs {
    /// `odom -> footprint`, before it is re-expressed in the base frame.
    pub fn footprint_in_odom(&self) -> Pose {
        footprint_in_odom(&self.left_foot, &self.right_foot, &self.base)
    }

    /// `base -> footprint`, the edge that gets published.
    pub fn compute(&self) -> Pose {
        compute_footprint(&self.left_foot, &self.right_foot, &self.base)
    }
}

/// Builds `odom -> footprint` from `odom -> left foot`, `odom -> right foot`
/// and `odom -> base`.
pub fn footprint_in_odom(odom_to_left: &Pose, odom_to_right: &Pose, odom_to_base: &Pose) -> Pose {
    let left = &odom_to_left.translation.vector;
    let right = &odom_to_right.translation.vector;

    let mut origin = (right + left) / 2.0;
    // The lower foot is the one on the ground.
    origin.z = left.z.min(right.z);

    let (_roll, _pitch, yaw) = odom_to_base.rotation.euler_angles();

    Isometry3::from_parts(
        Translation3::from(origin),
        UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
    )
}

/// Builds `base -> footprint` from `odom -> left foot`, `odom -> right foot`
/// and `odom -> base`. Pure; never fails.
pub fn compute_footprint(odom_to_left: &Pose, odom_to_right: &Pose, odom_to_base: &Pose) -> Pose {
    let odom_to_footprint = footprint_in_odom(odom_to_left, odom_to_right, odom_to_base);
    odom_to_base.inverse() * odom_to_footprint
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f64 = 1e-12;

    fn foot(x: f64, y: f64, z: f64) -> Pose {
        Isometry3::translation(x, y, z)
    }

    fn base(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Pose {
        Isometry3::from_parts(
            Translation3::new(x, y, z),
            UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        )
    }

    #[test]
    fn test_midpoint_of_feet() {
        let left = foot(0.3, 0.12, 0.05);
        let right = foot(-0.1, -0.08, 0.0);
        let footprint = footprint_in_odom(&left, &right, &Pose::identity());

        assert_abs_diff_eq!(footprint.translation.x, 0.1, epsilon = EPS);
        assert_abs_diff_eq!(footprint.translation.y, 0.02, epsilon = EPS);
    }

    #[test]
    fn test_height_is_lower_foot() {
        let level = Pose::identity();
        let raised_left = footprint_in_odom(&foot(0.0, 0.1, 0.04), &foot(0.0, -0.1, 0.01), &level);
        assert_abs_diff_eq!(raised_left.translation.z, 0.01, epsilon = EPS);

        let raised_right =
            footprint_in_odom(&foot(0.0, 0.1, -0.02), &foot(0.0, -0.1, 0.03), &level);
        assert_abs_diff_eq!(raised_right.translation.z, -0.02, epsilon = EPS);
    }

    #[test]
    fn test_only_yaw_survives() {
        let tilted = base(0.0, 0.0, 0.3, 0.2, -0.15, FRAC_PI_4);
        let footprint = footprint_in_odom(&foot(0.0, 0.1, 0.0), &foot(0.0, -0.1, 0.0), &tilted);

        let (roll, pitch, yaw) = footprint.rotation.euler_angles();
        assert_abs_diff_eq!(roll, 0.0, epsilon = EPS);
        assert_abs_diff_eq!(pitch, 0.0, epsilon = EPS);
        assert_abs_diff_eq!(yaw, FRAC_PI_4, epsilon = 1e-9);
    }

    #[test]
    fn test_standing_pose_with_quarter_turn() {
        // Feet either side of the origin, base turned by 90 degrees.
        let left = foot(0.0, 0.1, 0.0);
        let right = foot(0.0, -0.1, 0.02);
        let torso = base(0.0, 0.0, 0.3, 0.0, 0.0, FRAC_PI_2);

        let in_odom = footprint_in_odom(&left, &right, &torso);
        assert_abs_diff_eq!(in_odom.translation.vector, Vector3::new(0.0, 0.0, 0.0), epsilon = EPS);
        assert_abs_diff_eq!(in_odom.rotation.euler_angles().2, FRAC_PI_2, epsilon = 1e-9);

        // Base and footprint share heading, so in base the footprint lies straight down.
        let in_base = compute_footprint(&left, &right, &torso);
        assert_abs_diff_eq!(
            in_base.translation.vector,
            Vector3::new(0.0, 0.0, -0.3),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(in_base.rotation.angle(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_composes_back_to_odom() {
        let inputs = FootprintInputs {
            left_foot: foot(1.2, 0.4, 0.01),
            right_foot: foot(1.0, 0.2, 0.0),
            base: base(1.1, 0.3, 0.32, 0.05, 0.1, -0.7),
        };

        let recomposed = inputs.base * inputs.compute();
        let expected = inputs.footprint_in_odom();
        assert_abs_diff_eq!(
            recomposed.translation.vector,
            expected.translation.vector,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(recomposed.rotation.angle_to(&expected.rotation), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_footprint_in_base_has_no_yaw_offset() {
        // A tilted torso: the footprint differs from the base only by roll/pitch
        // and translation, never by heading.
        let torso = base(0.5, -0.2, 0.31, 0.1, -0.05, 2.0);
        let in_base = compute_footprint(&foot(0.5, -0.1, 0.0), &foot(0.5, -0.3, 0.0), &torso);
        let in_odom = torso * in_base;
        assert_abs_diff_eq!(in_odom.rotation.euler_angles().2, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(in_odom.translation.z, 0.0, epsilon = 1e-9);
    }
}
