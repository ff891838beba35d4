//! Ownership transfers between the physics world, the agent and disposal.
//!
//! An object is in exactly one of three modes:
//!
//! - **free**: it has a physics body and its scene node hangs under the scene root; the body
//!   pose is copied onto the node after every physics step
//! - **carried**: no body, the node is parented under the agent's mouth anchor at a fixed
//!   local offset
//! - **disposed**: gone from the live set, its body removed and its node released
//!
//! Every transfer tolerates stale state (a body or node someone else already removed) and
//! reports it through its return value instead of failing.

use glam::{Quat, Vec3};
use retriever_sim::{
    BodyDesc, BodyHandle, NodeId, NodeKind, PhysicsMaterial, PhysicsWorld, Pose, SceneGraph,
    Transform,
};
use tracing::debug;

use crate::objects::{BallKind, ObjectId, ObjectRegistry};

/// Local offset of a carried object of `radius` under the mouth anchor.
pub fn carry_offset(radius: f32) -> Vec3 {
    Vec3::new(0.0, (radius * 0.15).max(0.02), radius * 0.95 + 0.03)
}

/// Borrowed view over the three stores an ownership transfer has to keep consistent.
pub struct ObjectLifecycle<'a, P: PhysicsWorld> {
    pub scene: &'a mut SceneGraph,
    pub physics: &'a mut P,
    pub objects: &'a mut ObjectRegistry,
}

impl<'a, P: PhysicsWorld> ObjectLifecycle<'a, P> {
    pub fn new(
        scene: &'a mut SceneGraph,
        physics: &'a mut P,
        objects: &'a mut ObjectRegistry,
    ) -> Self {
        Self {
            scene,
            physics,
            objects,
        }
    }

    /// Create a free object: a visual node under the scene root plus a simulated body.
    pub fn spawn_free(
        &mut self,
        kind: BallKind,
        pose: Pose,
        velocity: Vec3,
        material: PhysicsMaterial,
    ) -> ObjectId {
        let radius = kind.radius();
        let node = self
            .scene
            .spawn(kind.name(), NodeKind::Visual, None, Transform::from_pose(pose));
        let body = self.physics.create_body(
            BodyDesc::sphere(radius, kind.mass(), pose)
                .with_material(material)
                .with_velocity(velocity),
        );
        let id = self.objects.insert(kind, node, radius, Some(body));
        debug!(object = id.0, kind = kind.name(), "object spawned");
        id
    }

    pub fn world_position(&self, id: ObjectId) -> Option<Vec3> {
        let object = self.objects.get(id)?;
        self.scene.world_position(object.node)
    }

    /// Physics velocity; `None` for carried objects.
    pub fn velocity(&self, id: ObjectId) -> Option<Vec3> {
        let body = self.objects.get(id)?.body?;
        self.physics.linear_velocity(body)
    }

    /// Free to carried: drop the body and hang the node under `anchor`.
    ///
    /// Returns `false` without touching anything when the object, its node or the anchor is
    /// gone. The body is only removed once the node hangs under the anchor.
    pub fn attach(&mut self, id: ObjectId, anchor: NodeId) -> bool {
        let Some(object) = self.objects.get_mut(id) else {
            return false;
        };
        if !self.scene.reparent_preserve_world_scale(object.node, anchor) {
            debug!(object = id.0, "attach skipped, node or anchor gone");
            return false;
        }

        if let Some(body) = object.body.take() {
            if !self.physics.remove_body(body) {
                debug!(object = id.0, body = body.0, "body already gone on attach");
            }
        }
        self.scene
            .set_local_pose(object.node, carry_offset(object.radius), Quat::IDENTITY);
        true
    }

    /// Carried to free: move the node back under the scene root at `pose` and give it a fresh body.
    pub fn release(
        &mut self,
        id: ObjectId,
        pose: Pose,
        mass: f32,
        friction: f32,
    ) -> Option<BodyHandle> {
        let object = self.objects.get_mut(id)?;
        let root = self.scene.root();
        if self.scene.contains(object.node) {
            self.scene.reparent_preserve_world_scale(object.node, root);
            self.scene
                .set_local_pose(object.node, pose.position, pose.rotation);
        }

        if let Some(stale) = object.body.take() {
            self.physics.remove_body(stale);
        }
        let material = PhysicsMaterial {
            friction,
            ..PhysicsMaterial::default()
        };
        let body = self
            .physics
            .create_body(BodyDesc::sphere(object.radius, mass, pose).with_material(material));
        object.body = Some(body);
        Some(body)
    }

    /// Remove the object from the live set, its body from physics and its node from the scene.
    pub fn dispose(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.objects.remove(id) else {
            return false;
        };
        if let Some(body) = object.body {
            self.physics.remove_body(body);
        }
        self.scene.release(object.node);
        debug!(object = id.0, "object disposed");
        true
    }

    /// Copy body poses onto the nodes of free objects.
    pub fn sync_from_physics(&mut self) {
        for object in self.objects.free() {
            let Some(body) = object.body else { continue };
            if let Some(pose) = self.physics.pose(body) {
                self.scene
                    .set_local_pose(object.node, pose.position, pose.rotation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retriever_sim::RapierWorld;

    struct Stores {
        scene: SceneGraph,
        physics: RapierWorld,
        objects: ObjectRegistry,
    }

    impl Stores {
        fn new() -> Self {
            Self {
                scene: SceneGraph::new(),
                physics: RapierWorld::new(Vec3::new(0.0, -9.8, 0.0), None),
                objects: ObjectRegistry::new(),
            }
        }

        fn bridge(&mut self) -> ObjectLifecycle<'_, RapierWorld> {
            ObjectLifecycle::new(&mut self.scene, &mut self.physics, &mut self.objects)
        }
    }

    #[test]
    fn carry_offset_matches_radius() {
        assert_eq!(carry_offset(0.1), Vec3::new(0.0, 0.02, 0.125));
        let big = carry_offset(0.3);
        assert!((big.y - 0.045).abs() < 1e-6);
        assert!((big.z - 0.315).abs() < 1e-6);
    }

    #[test]
    fn attach_then_release_moves_ownership() {
        let mut stores = Stores::new();
        let anchor = stores.scene.spawn(
            "mouth",
            NodeKind::Joint,
            None,
            Transform::from_translation(Vec3::new(1.0, 0.5, 0.0)).with_scale(Vec3::splat(0.05)),
        );
        let mut bridge = stores.bridge();
        let id = bridge.spawn_free(
            BallKind::TennisBall,
            Pose::at(Vec3::new(0.0, 0.1, 0.0)),
            Vec3::ZERO,
            PhysicsMaterial::default(),
        );

        assert!(bridge.attach(id, anchor));
        assert_eq!(bridge.physics.body_count(), 0);
        assert!(bridge.objects.get(id).unwrap().body.is_none());
        let node = bridge.objects.get(id).unwrap().node;
        assert_eq!(bridge.scene.node(node).unwrap().parent(), Some(anchor));
        assert_eq!(bridge.scene.local(node).unwrap().translation, carry_offset(0.1));
        assert!((bridge.scene.world_scale(node).unwrap() - Vec3::ONE).length() < 1e-5);

        let pose = Pose::at(Vec3::new(2.0, 0.12, 0.0));
        let body = bridge.release(id, pose, 10.0, 0.5).unwrap();
        assert_eq!(bridge.physics.pose(body), Some(pose));
        assert_eq!(bridge.world_position(id), Some(pose.position));
        assert!((bridge.scene.world_scale(node).unwrap() - Vec3::ONE).length() < 1e-5);
    }

    #[test]
    fn transfers_tolerate_missing_pieces() {
        let mut stores = Stores::new();
        let mut bridge = stores.bridge();
        let id = bridge.spawn_free(
            BallKind::Football,
            Pose::at(Vec3::new(0.0, 0.3, 0.0)),
            Vec3::ZERO,
            PhysicsMaterial::default(),
        );

        assert!(!bridge.attach(id, NodeId(999)));
        assert!(bridge.objects.get(id).unwrap().body.is_some());

        // Body removed behind the bridge's back.
        let body = bridge.objects.get(id).unwrap().body.unwrap();
        bridge.physics.remove_body(body);
        bridge.sync_from_physics();
        assert!(bridge.dispose(id));
        assert!(!bridge.dispose(id));
        assert!(bridge.release(id, Pose::IDENTITY, 10.0, 0.5).is_none());
        assert_eq!(bridge.velocity(id), None);
    }
}
