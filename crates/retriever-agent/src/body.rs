//! The agent's body: transform, steering, animation and the carry/drop primitives.

use glam::{Quat, Vec3};
use retriever_sim::{
    rotate_towards, yaw_towards, Animator, NodeId, NodeKind, PhysicsWorld, Pose, SceneGraph,
    Transform, FORWARD,
};
use tracing::{debug, info, warn};

use crate::config::{AgentConfig, DropConfig, DropPolicy, ReturnTo};
use crate::lifecycle::ObjectLifecycle;
use crate::objects::ObjectId;
use crate::rig::{resolve_mouth_anchor, AgentRig};

/// Clips tried in order for the pose the agent starts in.
const INITIAL_CLIPS: [&str; 2] = ["idle1", "idleeartwitch"];

pub const RUN_CLIP: &str = "runcycle";
pub const IDLE_CLIP: &str = "idlesit";

#[derive(Debug, Clone, Copy, PartialEq)]
struct DropCooldown {
    object: ObjectId,
    until: f32,
}

/// Outcome of a successful drop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropReport {
    pub object: ObjectId,
    /// Pose the fresh physics body was created at.
    pub pose: Pose,
    pub disposed: bool,
}

#[derive(Debug, Clone)]
pub struct AgentBody {
    pub node: NodeId,
    pub mouth: NodeId,
    /// The mouth hangs under the agent root because no snout joint was found.
    pub mouth_fallback: bool,
    pub animator: Animator,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub turn_speed: f32,
    pub return_to: ReturnTo,
    pub home: Vec3,
    drop_cooldown: f32,
    carrying: Option<ObjectId>,
    cooldown: Option<DropCooldown>,
}

impl AgentBody {
    /// Build the agent subtree under the scene root, resolve its mouth anchor and put down the
    /// static home ring.
    pub fn spawn(scene: &mut SceneGraph, config: &AgentConfig, rig: &AgentRig) -> Self {
        let local = Transform {
            translation: config.home,
            rotation: Quat::from_rotation_y(config.start_yaw),
            scale: Vec3::splat(config.scale),
        };
        let node = scene.spawn("retriever", NodeKind::Group, None, local);
        rig.instantiate(scene, node);
        let (mouth, mouth_fallback) = resolve_mouth_anchor(scene, node);

        scene.spawn(
            "home_ring",
            NodeKind::Marker,
            None,
            Transform::from_translation(Vec3::new(config.home.x, 0.005, config.home.z)),
        );

        let mut animator = Animator::new(rig.clips.iter().cloned());
        let posed = INITIAL_CLIPS.iter().any(|clip| animator.play(clip)) || animator.play_any();
        if !posed {
            warn!("agent rig has no animation clips");
        }

        Self {
            node,
            mouth,
            mouth_fallback,
            animator,
            walk_speed: config.walk_speed,
            run_speed: config.run_speed,
            turn_speed: config.turn_speed,
            return_to: config.return_to,
            home: config.home,
            drop_cooldown: config.drop_cooldown,
            carrying: None,
            cooldown: None,
        }
    }

    pub fn pose(&self, scene: &SceneGraph) -> Pose {
        scene.world_pose(self.node).unwrap_or_default()
    }

    pub fn position(&self, scene: &SceneGraph) -> Vec3 {
        self.pose(scene).position
    }

    pub fn set_pose(&self, scene: &mut SceneGraph, position: Vec3, yaw: f32) {
        scene.set_local_pose(self.node, position, Quat::from_rotation_y(yaw));
    }

    pub fn carrying(&self) -> Option<ObjectId> {
        self.carrying
    }

    pub fn is_carrying(&self) -> bool {
        self.carrying.is_some()
    }

    /// Whether `object` was dropped too recently to be targeted again.
    pub fn is_ignoring(&self, object: ObjectId, now: f32) -> bool {
        self.cooldown
            .is_some_and(|c| c.object == object && now < c.until)
    }

    /// Select a clip by name; an unknown name leaves the current clip playing.
    pub fn play(&mut self, clip: &str) -> bool {
        self.animator.play(clip)
    }

    /// Turn toward `target` at the turn rate, then advance along the new heading by at most
    /// `speed * dt` without overshooting.
    pub fn move_towards(&self, scene: &mut SceneGraph, target: Vec3, dt: f32, speed: f32) {
        let Some(mut local) = scene.local(self.node) else {
            return;
        };
        let mut dir = target - local.translation;
        dir.y = 0.0;
        let dist = dir.length();
        if dist < 1e-3 {
            return;
        }

        if let Some(goal) = yaw_towards(dir) {
            local.rotation = rotate_towards(local.rotation, goal, self.turn_speed * dt);
        }
        let step = dist.min(speed * dt);
        local.translation += (local.rotation * FORWARD) * step;
        scene.set_local(self.node, local);
    }

    /// Blend the heading toward `point` by fraction `t`.
    pub fn face_towards(&self, scene: &mut SceneGraph, point: Vec3, t: f32) {
        let Some(mut local) = scene.local(self.node) else {
            return;
        };
        let Some(goal) = yaw_towards(point - local.translation) else {
            return;
        };
        local.rotation = local.rotation.slerp(goal, t.clamp(0.0, 1.0)).normalize();
        scene.set_local(self.node, local);
    }

    /// Take `object` into the mouth.
    pub fn pickup<P: PhysicsWorld>(
        &mut self,
        bridge: &mut ObjectLifecycle<'_, P>,
        object: ObjectId,
    ) -> bool {
        if self.carrying.is_some() {
            return false;
        }
        if !bridge.attach(object, self.mouth) {
            debug!(object = object.0, "pickup skipped, object or anchor gone");
            return false;
        }
        self.carrying = Some(object);
        info!(object = object.0, "picked up");
        true
    }

    /// World pose a carried object of `radius` is put down at.
    pub fn drop_pose(&self, scene: &SceneGraph, radius: f32, config: &DropConfig) -> Pose {
        let agent = self.pose(scene);
        let mouth = scene.world_position(self.mouth).unwrap_or(agent.position);
        let mut position = mouth + agent.forward() * (radius + config.clearance);
        position.y = (radius + config.ground_margin).max(config.ground_margin);
        Pose::new(position, agent.rotation)
    }

    /// Put the carried object down in front of the mouth.
    ///
    /// A fresh body is created at the drop pose and a marker flashes at home. Under
    /// [`DropPolicy::Dispose`] the object is then disposed right away.
    pub fn drop_in_front<P: PhysicsWorld>(
        &mut self,
        bridge: &mut ObjectLifecycle<'_, P>,
        config: &DropConfig,
        now: f32,
    ) -> Option<DropReport> {
        let object = self.carrying.take()?;
        let Some(radius) = bridge.objects.get(object).map(|o| o.radius) else {
            debug!(object = object.0, "carried object vanished before drop");
            return None;
        };

        let pose = self.drop_pose(bridge.scene, radius, config);
        bridge.release(object, pose, config.body_mass, config.friction)?;
        bridge.scene.spawn_transient_marker(self.home);

        let disposed = match config.policy {
            DropPolicy::Dispose => bridge.dispose(object),
            DropPolicy::KeepSimulated => false,
        };
        self.cooldown = Some(DropCooldown {
            object,
            until: now + self.drop_cooldown,
        });
        info!(object = object.0, disposed, "dropped");

        Some(DropReport {
            object,
            pose,
            disposed,
        })
    }
}
