//! Arena bounds and the spatial predicates the brain uses for target eligibility.

use glam::Vec3;
use retriever_sim::planar_distance;

use crate::config::ArenaConfig;

/// Axis-aligned ground rectangle centred on the origin, ground plane at `y = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub half_x: f32,
    pub half_z: f32,
    pub edge_margin: f32,
    pub predict_seconds: f32,
    pub predicted_margin: f32,
    pub fall_height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::from_config(&ArenaConfig::default())
    }
}

impl Arena {
    pub fn new(half_x: f32, half_z: f32) -> Self {
        Self {
            half_x,
            half_z,
            ..Self::default()
        }
    }

    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            half_x: config.half_x,
            half_z: config.half_z,
            edge_margin: config.edge_margin,
            predict_seconds: config.predict_seconds,
            predicted_margin: config.predicted_margin,
            fall_height: config.fall_height,
        }
    }

    /// True when `position` lies within the half-extents (inclusive).
    pub fn contains(&self, position: Vec3) -> bool {
        position.x.abs() <= self.half_x && position.z.abs() <= self.half_z
    }

    /// Whether an object at `position` is about to leave the arena.
    ///
    /// Without a velocity (no physics body) only the height and bounds checks apply. With one, the
    /// object is also unsafe when it moves outward inside the edge band, or when its position
    /// `predict_seconds` ahead crosses the bounds shrunk by `predicted_margin`.
    pub fn will_fall(&self, position: Vec3, velocity: Option<Vec3>) -> bool {
        if position.y < self.fall_height {
            return true;
        }
        if !self.contains(position) {
            return true;
        }
        let Some(v) = velocity else {
            return false;
        };

        let near_edge_x = position.x.abs() > self.half_x - self.edge_margin;
        let near_edge_z = position.z.abs() > self.half_z - self.edge_margin;
        if near_edge_x && moving_out(position.x, v.x) {
            return true;
        }
        if near_edge_z && moving_out(position.z, v.z) {
            return true;
        }

        let px = position.x + v.x * self.predict_seconds;
        let pz = position.z + v.z * self.predict_seconds;
        px.abs() > self.half_x - self.predicted_margin
            || pz.abs() > self.half_z - self.predicted_margin
    }
}

fn moving_out(p: f32, v: f32) -> bool {
    (p > 0.0 && v > 0.0) || (p < 0.0 && v < 0.0)
}

/// Ground-plane distance between the agent and an object.
pub fn distance(agent: Vec3, object: Vec3) -> f32 {
    planar_distance(agent, object)
}
