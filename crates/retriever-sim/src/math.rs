use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local forward axis of every agent and carried object.
pub const FORWARD: Vec3 = Vec3::Z;

/// Position + orientation, the unit the physics service speaks in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * FORWARD
    }
}

/// Translation, rotation and per-axis scale relative to a parent.
///
/// Composition follows the usual TRS rule without shear; that is exact for the hierarchies
/// the scene builds (uniform or axis-aligned scales).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_pose(pose: Pose) -> Self {
        Self {
            translation: pose.position,
            rotation: pose.rotation,
            scale: Vec3::ONE,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.translation, self.rotation)
    }

    /// `self` is the parent's world transform, `child` the child's local transform.
    pub fn mul_transform(&self, child: &Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.translation + self.rotation * (self.scale * point)
    }
}

/// Distance on the ground plane (y ignored).
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let d = b - a;
    (d.x * d.x + d.z * d.z).sqrt()
}

/// Heading that turns [`FORWARD`] onto the horizontal direction `dir`.
///
/// `None` when `dir` has no usable horizontal component.
pub fn yaw_towards(dir: Vec3) -> Option<Quat> {
    let flat = Vec3::new(dir.x, 0.0, dir.z).try_normalize()?;
    Some(Quat::from_rotation_y(flat.x.atan2(flat.z)))
}

/// Rotate `from` toward `to` by at most `max_angle` radians.
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle.max(0.0) || angle <= f32::EPSILON {
        return to;
    }
    from.slerp(to, max_angle.max(0.0) / angle).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn yaw_towards_maps_forward_onto_direction() {
        for dir in [Vec3::X, -Vec3::X, Vec3::Z, -Vec3::Z, Vec3::new(1.0, 3.0, -1.0)] {
            let q = yaw_towards(dir).unwrap();
            let expected = Vec3::new(dir.x, 0.0, dir.z).normalize();
            assert!((q * FORWARD - expected).length() < 1e-5, "{dir:?}");
        }
        assert!(yaw_towards(Vec3::Y).is_none());
    }

    #[test]
    fn rotate_towards_is_rate_limited() {
        let from = Quat::IDENTITY;
        let to = Quat::from_rotation_y(PI * 0.75);
        let step = rotate_towards(from, to, 0.1);
        assert!((from.angle_between(step) - 0.1).abs() < 1e-3);
        assert_eq!(
            rotate_towards(from, Quat::from_rotation_y(0.05), 0.1),
            Quat::from_rotation_y(0.05)
        );
    }

    #[test]
    fn transform_composition_applies_parent_scale_and_rotation() {
        let parent = Transform {
            translation: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(FRAC_PI_2),
            scale: Vec3::splat(2.0),
        };
        let child = Transform::from_translation(Vec3::Z);
        let world = parent.mul_transform(&child);
        assert!((world.translation - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(world.scale, Vec3::splat(2.0));
    }

    #[test]
    fn planar_distance_ignores_height() {
        assert_eq!(planar_distance(Vec3::new(0.0, 5.0, 0.0), Vec3::new(3.0, -2.0, 4.0)), 5.0);
    }
}
