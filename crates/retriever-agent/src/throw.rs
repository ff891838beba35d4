//! Producer side of the live set: launching new objects into the arena.

use glam::Vec3;
use retriever_sim::{PhysicsMaterial, PhysicsWorld, Pose};
use tracing::debug;

use crate::config::ThrowConfig;
use crate::objects::{BallKind, ObjectId};
use crate::world::FetchWorld;

#[derive(Debug, Clone, PartialEq)]
pub struct Thrower {
    config: ThrowConfig,
}

impl Thrower {
    pub fn new(config: ThrowConfig) -> Self {
        Self { config }
    }

    /// Launch speed for a charge held `charge_seconds`, eased between min and max speed.
    pub fn charge_to_speed(&self, charge_seconds: f32) -> f32 {
        let c = &self.config;
        let t = (charge_seconds.max(0.0) / c.full_charge_seconds).min(1.0);
        c.min_speed + (c.max_speed - c.min_speed) * t.powf(c.charge_exponent)
    }

    /// Spawn `kind` along the ray from `origin` and send it flying.
    ///
    /// `None` when `direction` has no length.
    pub fn throw<P: PhysicsWorld>(
        &self,
        world: &mut FetchWorld<P>,
        kind: BallKind,
        origin: Vec3,
        direction: Vec3,
        charge_seconds: f32,
    ) -> Option<ObjectId> {
        let direction = direction.try_normalize()?;
        let speed = self.charge_to_speed(charge_seconds);
        let spawn = origin + direction * self.config.spawn_offset;
        let material = PhysicsMaterial {
            friction: self.config.friction,
            restitution: kind.restitution(),
        };
        let id = world.spawn_object(kind, Pose::at(spawn), direction * speed, material);
        debug!(object = id.0, kind = kind.name(), speed, "thrown");
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;

    #[test]
    fn charge_curve_is_clamped_and_eased() {
        let thrower = Thrower::new(ThrowConfig::default());
        assert_eq!(thrower.charge_to_speed(0.0), 6.0);
        assert_eq!(thrower.charge_to_speed(-1.0), 6.0);
        assert_eq!(thrower.charge_to_speed(1.5), 28.0);
        assert_eq!(thrower.charge_to_speed(10.0), 28.0);
        let half = thrower.charge_to_speed(0.75);
        assert!((half - (6.0 + 22.0 * 0.5f32.powf(1.5))).abs() < 1e-4);
    }

    #[test]
    fn throw_registers_a_moving_object() {
        let mut world = FetchWorld::new(FetchConfig::default());
        let thrower = Thrower::new(ThrowConfig::default());
        let id = thrower
            .throw(&mut world, BallKind::BeachBall, Vec3::new(0.0, 1.6, 6.0), -Vec3::Z, 0.0)
            .unwrap();

        assert!(world.is_live(id));
        let spawned = world.object_position(id).unwrap();
        assert!((spawned - Vec3::new(0.0, 1.6, 4.8)).length() < 1e-5);
        assert_eq!(world.object_velocity(id), Some(Vec3::new(0.0, 0.0, -6.0)));
        assert!(thrower
            .throw(&mut world, BallKind::TennisBall, Vec3::ZERO, Vec3::ZERO, 1.0)
            .is_none());
    }
}
