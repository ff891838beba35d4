//! Rigid-body physics service.
//!
//! The agent only needs a handful of operations from a physics engine: create/remove a body,
//! read its pose and velocity, and step the simulation. [`PhysicsWorld`] is that seam;
//! [`RapierWorld`] backs it with `rapier3d` (ball colliders over a finite ground slab).

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::math::Pose;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    pub friction: f32,
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

/// A sphere body to create.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub radius: f32,
    /// Zero mass makes the body static.
    pub mass: f32,
    pub pose: Pose,
    pub material: PhysicsMaterial,
    pub linear_velocity: Vec3,
}

impl BodyDesc {
    pub fn sphere(radius: f32, mass: f32, pose: Pose) -> Self {
        Self {
            radius,
            mass,
            pose,
            material: PhysicsMaterial::default(),
            linear_velocity: Vec3::ZERO,
        }
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }
}

/// Physics service consumed by the agent core.
///
/// Every accessor takes a handle that may be stale (the body was removed by someone else);
/// implementations answer `None`/`false` instead of panicking.
pub trait PhysicsWorld: 'static {
    fn step(&mut self, dt: f32);
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;
    fn remove_body(&mut self, handle: BodyHandle) -> bool;
    fn contains(&self, handle: BodyHandle) -> bool;
    fn pose(&self, handle: BodyHandle) -> Option<Pose>;
    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3>;
    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> bool;
    fn body_count(&self) -> usize;
}

/// Horizontal footprint of the ground slab; outside it, bodies keep falling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundPatch {
    pub half_x: f32,
    pub half_z: f32,
}

impl GroundPatch {
    /// Half thickness of the slab whose top face is the plane y = 0.
    const HALF_THICKNESS: f32 = 0.5;

    fn collider(&self) -> Collider {
        ColliderBuilder::cuboid(self.half_x, Self::HALF_THICKNESS, self.half_z)
            .translation(vector![0.0, -Self::HALF_THICKNESS, 0.0])
            .friction(0.8)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .build()
    }
}

fn to_rapier_vec(v: Vec3) -> Vector3<Real> {
    Vector3::new(v.x, v.y, v.z)
}

fn to_rapier_isometry(pose: Pose) -> Isometry3<Real> {
    let q = pose.rotation;
    Isometry3::from_parts(
        Translation3::new(pose.position.x, pose.position.y, pose.position.z),
        UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z)),
    )
}

fn from_rapier_vec(v: &Vector3<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn from_rapier_quat(q: &UnitQuaternion<Real>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

/// [`PhysicsWorld`] on top of a rapier pipeline.
///
/// Steps in fixed substeps of 1/60 s (at most ten per call) so a run is reproducible for a
/// given frame sequence.
pub struct RapierWorld {
    gravity: Vector3<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    handles: BTreeMap<BodyHandle, RigidBodyHandle>,
    next_handle: u64,
}

impl RapierWorld {
    const FIXED_DT: f32 = 1.0 / 60.0;
    const MAX_SUBSTEPS: u32 = 10;
    /// Stands in for rolling resistance, which rapier balls do not have.
    const ROLLING_DAMPING: f32 = 0.8;

    pub fn new(gravity: Vec3, ground: Option<GroundPatch>) -> Self {
        let mut collider_set = ColliderSet::new();
        if let Some(ground) = ground {
            collider_set.insert(ground.collider());
        }
        Self {
            gravity: to_rapier_vec(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set,
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            handles: BTreeMap::new(),
            next_handle: 1,
        }
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(*self.handles.get(&handle)?)
    }

    fn run_pipeline(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}

impl PhysicsWorld for RapierWorld {
    fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let steps = ((dt / Self::FIXED_DT).ceil() as u32).clamp(1, Self::MAX_SUBSTEPS);
        let h = dt / steps as f32;
        for _ in 0..steps {
            self.run_pipeline(h);
        }
    }

    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let builder = if desc.mass > 0.0 {
            RigidBodyBuilder::dynamic()
                .linvel(to_rapier_vec(desc.linear_velocity))
                .linear_damping(Self::ROLLING_DAMPING * desc.material.friction)
                .angular_damping(Self::ROLLING_DAMPING)
                .ccd_enabled(true)
        } else {
            RigidBodyBuilder::fixed()
        };
        let rigid_body = builder.position(to_rapier_isometry(desc.pose)).build();
        let body = self.rigid_body_set.insert(rigid_body);

        let mut collider = ColliderBuilder::ball(desc.radius)
            .friction(desc.material.friction)
            .restitution(desc.material.restitution);
        if desc.mass > 0.0 {
            collider = collider.mass(desc.mass);
        }
        self.collider_set
            .insert_with_parent(collider.build(), body, &mut self.rigid_body_set);

        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle, body);
        tracing::trace!(body = handle.0, mass = desc.mass, "physics body created");
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(body) = self.handles.remove(&handle) else {
            return false;
        };
        self.rigid_body_set
            .remove(
                body,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some()
    }

    fn pose(&self, handle: BodyHandle) -> Option<Pose> {
        let body = self.body(handle)?;
        Some(Pose::new(
            from_rapier_vec(body.translation()),
            from_rapier_quat(body.rotation()),
        ))
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|b| from_rapier_vec(b.linvel()))
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> bool {
        let Some(&body) = self.handles.get(&handle) else {
            return false;
        };
        match self.rigid_body_set.get_mut(body) {
            Some(body) => {
                body.set_linvel(to_rapier_vec(velocity), true);
                true
            }
            None => false,
        }
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }
}
