//! The world the brain runs against and the per-frame driver around it.

use glam::Vec3;
use retriever_core::{WorldMut, WorldView};
use retriever_sim::{GroundPatch, PhysicsMaterial, PhysicsWorld, Pose, RapierWorld, SceneGraph};
use tracing::debug;

use crate::arena::{self, Arena};
use crate::body::{AgentBody, DropReport};
use crate::config::FetchConfig;
use crate::lifecycle::ObjectLifecycle;
use crate::objects::{BallKind, ObjectId, ObjectRegistry};
use crate::rig::AgentRig;
use crate::targeting::{select_target, Candidate, TargetChoice};

/// Running totals, mostly for the CLI summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub spawned: u64,
    pub pickups: u64,
    pub drops: u64,
    pub disposed: u64,
    /// Free objects removed after falling off the arena.
    pub culled: u64,
}

/// Arena, scene, physics, the live set and the agent, owned in one place.
///
/// Fields are public so frame code can split borrows (for example to build an
/// [`ObjectLifecycle`] while reading the agent).
pub struct FetchWorld<P: PhysicsWorld = RapierWorld> {
    pub config: FetchConfig,
    pub arena: Arena,
    pub scene: SceneGraph,
    pub physics: P,
    pub objects: ObjectRegistry,
    pub agent: AgentBody,
    pub stats: FetchStats,
    clock: f32,
}

impl<P: PhysicsWorld> WorldView for FetchWorld<P> {}
impl<P: PhysicsWorld> WorldMut for FetchWorld<P> {}

/// Physics world matching the arena: configured gravity over a ground patch the arena's size.
pub fn arena_physics(config: &FetchConfig) -> RapierWorld {
    RapierWorld::new(
        Vec3::new(0.0, config.physics.gravity, 0.0),
        Some(GroundPatch {
            half_x: config.arena.half_x,
            half_z: config.arena.half_z,
        }),
    )
}

impl FetchWorld<RapierWorld> {
    pub fn new(config: FetchConfig) -> Self {
        let physics = arena_physics(&config);
        Self::with_parts(config, physics, &AgentRig::dog())
    }
}

impl<P: PhysicsWorld> FetchWorld<P> {
    pub fn with_parts(config: FetchConfig, physics: P, rig: &AgentRig) -> Self {
        let mut scene = SceneGraph::new();
        let agent = AgentBody::spawn(&mut scene, &config.agent, rig);
        Self {
            arena: Arena::from_config(&config.arena),
            config,
            scene,
            physics,
            objects: ObjectRegistry::new(),
            agent,
            stats: FetchStats::default(),
            clock: 0.0,
        }
    }

    /// Simulated seconds since the world was created.
    pub fn now(&self) -> f32 {
        self.clock
    }

    pub fn lifecycle(&mut self) -> ObjectLifecycle<'_, P> {
        ObjectLifecycle::new(&mut self.scene, &mut self.physics, &mut self.objects)
    }

    /// Advance physics, mirror body poses into the scene, cull fallen objects and age effects.
    ///
    /// Free objects whose scene node was released elsewhere are culled as well.
    pub fn step(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.physics.step(dt);
        self.lifecycle().sync_from_physics();

        let kill_height = self.config.arena.kill_height;
        let fallen: Vec<ObjectId> = self
            .objects
            .free()
            .filter(|o| {
                self.scene
                    .world_position(o.node)
                    .is_none_or(|p| p.y < kill_height)
            })
            .map(|o| o.id)
            .collect();
        for id in fallen {
            if self.lifecycle().dispose(id) {
                self.stats.culled += 1;
                debug!(object = id.0, "free object culled");
            }
        }

        self.scene.update_markers(dt);
        self.agent.animator.update(dt);
        self.clock += dt;
    }

    /// Spawn a free object with an initial velocity.
    pub fn spawn_object(
        &mut self,
        kind: BallKind,
        pose: Pose,
        velocity: Vec3,
        material: PhysicsMaterial,
    ) -> ObjectId {
        let id = self.lifecycle().spawn_free(kind, pose, velocity, material);
        self.stats.spawned += 1;
        id
    }

    /// Place a resting object on the ground at `(x, z)`.
    pub fn place_object(&mut self, kind: BallKind, x: f32, z: f32) -> ObjectId {
        let material = PhysicsMaterial {
            restitution: kind.restitution(),
            ..PhysicsMaterial::default()
        };
        let pose = Pose::at(Vec3::new(x, kind.radius(), z));
        self.spawn_object(kind, pose, Vec3::ZERO, material)
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.objects.contains(id)
    }

    pub fn object_position(&self, id: ObjectId) -> Option<Vec3> {
        let object = self.objects.get(id)?;
        self.scene.world_position(object.node)
    }

    pub fn object_velocity(&self, id: ObjectId) -> Option<Vec3> {
        let body = self.objects.get(id)?.body?;
        self.physics.linear_velocity(body)
    }

    /// `true` for objects that are gone or predicted to leave the arena.
    pub fn will_fall(&self, id: ObjectId) -> bool {
        match self.object_position(id) {
            Some(position) => self.arena.will_fall(position, self.object_velocity(id)),
            None => true,
        }
    }

    pub fn agent_pose(&self) -> Pose {
        self.agent.pose(&self.scene)
    }

    pub fn agent_position(&self) -> Vec3 {
        self.agent.position(&self.scene)
    }

    pub fn set_agent_pose(&mut self, position: Vec3, yaw: f32) {
        self.agent.set_pose(&mut self.scene, position, yaw);
    }

    /// Ground distance from the agent to a live object.
    pub fn distance_to(&self, id: ObjectId) -> Option<f32> {
        let position = self.object_position(id)?;
        Some(arena::distance(self.agent_position(), position))
    }

    /// Straight-line distance from the agent to a live object. Seek and pickup thresholds use
    /// this so objects overhead are out of reach.
    pub fn reach_distance(&self, id: ObjectId) -> Option<f32> {
        let position = self.object_position(id)?;
        Some(self.agent_position().distance(position))
    }

    /// Free objects the agent may target right now.
    pub fn candidates(&self) -> Vec<Candidate> {
        let agent = self.agent_position();
        let now = self.now();
        self.objects
            .free()
            .filter(|o| o.is_ball && !self.agent.is_ignoring(o.id, now))
            .filter_map(|o| {
                let position = self.scene.world_position(o.node)?;
                let velocity = o.body.and_then(|b| self.physics.linear_velocity(b));
                if self.arena.will_fall(position, velocity) {
                    return None;
                }
                Some(Candidate {
                    id: o.id,
                    distance: arena::distance(agent, position),
                })
            })
            .collect()
    }

    /// Run the hysteresis heuristic against the current target.
    pub fn choose_next_target(&self, current: Option<ObjectId>) -> TargetChoice {
        let candidates = self.candidates();
        let current_entry = current.and_then(|id| candidates.iter().find(|c| c.id == id).copied());
        select_target(
            candidates,
            current_entry,
            current,
            self.config.agent.switch_threshold,
        )
    }

    pub fn move_agent_towards(&mut self, target: Vec3, dt: f32, speed: f32) {
        self.agent.move_towards(&mut self.scene, target, dt, speed);
    }

    pub fn face_agent_towards(&mut self, point: Vec3, t: f32) {
        self.agent.face_towards(&mut self.scene, point, t);
    }

    pub fn pickup(&mut self, id: ObjectId) -> bool {
        let mut bridge =
            ObjectLifecycle::new(&mut self.scene, &mut self.physics, &mut self.objects);
        let picked = self.agent.pickup(&mut bridge, id);
        if picked {
            self.stats.pickups += 1;
        }
        picked
    }

    pub fn drop_carried(&mut self) -> Option<DropReport> {
        let now = self.clock;
        let mut bridge =
            ObjectLifecycle::new(&mut self.scene, &mut self.physics, &mut self.objects);
        let report = self.agent.drop_in_front(&mut bridge, &self.config.drop, now)?;
        self.stats.drops += 1;
        if report.disposed {
            self.stats.disposed += 1;
        }
        Some(report)
    }
}
