//! Fetch loop configuration, loaded from YAML.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the values it overrides:
//!
//! ```yaml
//! arena:
//!   half_x: 12.0
//! agent:
//!   return_to: player
//! drop:
//!   policy: keep_simulated
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub arena: ArenaConfig,
    pub agent: AgentConfig,
    pub drop: DropConfig,
    pub throw: ThrowConfig,
    pub physics: PhysicsConfig,
}

/// Ground bounds and the off-arena prediction tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub half_x: f32,
    pub half_z: f32,
    /// Band along each boundary in which outward motion counts as leaving.
    pub edge_margin: f32,
    /// Horizon of the linear position prediction, in seconds.
    pub predict_seconds: f32,
    pub predicted_margin: f32,
    /// Objects below this height are already falling off.
    pub fall_height: f32,
    /// Free objects below this height are disposed by the frame driver.
    pub kill_height: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            half_x: 20.0,
            half_z: 20.0,
            edge_margin: 1.2,
            predict_seconds: 0.7,
            predicted_margin: 0.05,
            fall_height: -0.2,
            kill_height: -10.0,
        }
    }
}

/// Where a carried object is brought back to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnTo {
    #[default]
    Home,
    /// A point in front of the player along the camera forward.
    Player,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub walk_speed: f32,
    pub run_speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
    pub return_to: ReturnTo,
    /// Start position; doubles as the home point.
    pub home: Vec3,
    /// Initial yaw in radians.
    pub start_yaw: f32,
    pub scale: f32,
    pub pickup_radius: f32,
    pub pickup_guard: f32,
    pub arrive_radius: f32,
    pub switch_threshold: f32,
    pub return_speed_factor: f32,
    pub player_drop_offset: f32,
    pub idle_turn_blend: f32,
    pub drop_cooldown: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            walk_speed: 1.8,
            run_speed: 4.2,
            turn_speed: 6.0,
            return_to: ReturnTo::Home,
            home: Vec3::new(0.0, 0.0, -2.0),
            start_yaw: std::f32::consts::PI,
            scale: 0.05,
            pickup_radius: 0.6,
            pickup_guard: 0.8,
            arrive_radius: 0.6,
            switch_threshold: 0.8,
            return_speed_factor: 1.25,
            player_drop_offset: 0.8,
            idle_turn_blend: 0.3,
            drop_cooldown: 0.6,
        }
    }
}

/// What happens to an object right after it is put down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Create the drop body, then dispose the object in the same tick.
    #[default]
    Dispose,
    /// Leave the dropped object simulated and fetchable again after the cooldown.
    KeepSimulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Distance in front of the mouth beyond the object radius.
    pub clearance: f32,
    pub ground_margin: f32,
    pub body_mass: f32,
    pub friction: f32,
    pub policy: DropPolicy,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            clearance: 0.08,
            ground_margin: 0.02,
            body_mass: 10.0,
            friction: 0.5,
            policy: DropPolicy::Dispose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrowConfig {
    pub min_speed: f32,
    pub max_speed: f32,
    /// Charge time that reaches `max_speed`.
    pub full_charge_seconds: f32,
    pub charge_exponent: f32,
    /// Spawn distance along the throw ray.
    pub spawn_offset: f32,
    pub friction: f32,
}

impl Default for ThrowConfig {
    fn default() -> Self {
        Self {
            min_speed: 6.0,
            max_speed: 28.0,
            full_charge_seconds: 1.5,
            charge_exponent: 1.5,
            spawn_offset: 1.2,
            friction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { gravity: -9.8 }
    }
}

impl FetchConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML text. A blank document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena.half_x", self.arena.half_x)?;
        positive("arena.half_z", self.arena.half_z)?;
        non_negative("arena.edge_margin", self.arena.edge_margin)?;
        non_negative("arena.predict_seconds", self.arena.predict_seconds)?;

        positive("agent.walk_speed", self.agent.walk_speed)?;
        positive("agent.run_speed", self.agent.run_speed)?;
        positive("agent.turn_speed", self.agent.turn_speed)?;
        positive("agent.scale", self.agent.scale)?;
        positive("agent.pickup_radius", self.agent.pickup_radius)?;
        positive("agent.arrive_radius", self.agent.arrive_radius)?;
        positive("agent.return_speed_factor", self.agent.return_speed_factor)?;
        non_negative("agent.switch_threshold", self.agent.switch_threshold)?;
        non_negative("agent.drop_cooldown", self.agent.drop_cooldown)?;
        if self.agent.pickup_guard < self.agent.pickup_radius {
            return Err(ConfigError::Invalid {
                field: "agent.pickup_guard",
                reason: format!(
                    "must be at least pickup_radius ({}), got {}",
                    self.agent.pickup_radius, self.agent.pickup_guard
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.agent.idle_turn_blend) {
            return Err(ConfigError::Invalid {
                field: "agent.idle_turn_blend",
                reason: format!("must be within [0, 1], got {}", self.agent.idle_turn_blend),
            });
        }

        positive("drop.body_mass", self.drop.body_mass)?;
        non_negative("drop.clearance", self.drop.clearance)?;

        positive("throw.min_speed", self.throw.min_speed)?;
        positive("throw.full_charge_seconds", self.throw.full_charge_seconds)?;
        positive("throw.charge_exponent", self.throw.charge_exponent)?;
        if self.throw.max_speed < self.throw.min_speed {
            return Err(ConfigError::Invalid {
                field: "throw.max_speed",
                reason: format!(
                    "must be at least min_speed ({}), got {}",
                    self.throw.min_speed, self.throw.max_speed
                ),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be positive, got {value}"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must not be negative, got {value}"),
        })
    }
}
