//! Collaborator services for the retriever agent.
//!
//! The agent core treats scene graph, physics and animation as external services. This crate
//! gives each one a small concrete implementation so the core can be driven headless:
//!
//! - [`scene`]: transform hierarchy with world-scale-preserving reparenting and transient markers
//! - [`physics`]: the [`PhysicsWorld`] service trait and its `rapier3d` backend [`RapierWorld`]
//! - [`animation`]: clip selection by lowercase name with cross-fade
//! - [`math`]: pose/transform helpers on top of `glam`

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod animation;
pub mod math;
pub mod physics;
pub mod scene;

pub use animation::{Animator, Clip};
pub use math::{planar_distance, rotate_towards, yaw_towards, Pose, Transform, FORWARD};
pub use physics::{BodyDesc, BodyHandle, GroundPatch, PhysicsMaterial, PhysicsWorld, RapierWorld};
pub use scene::{NodeId, NodeKind, SceneGraph, SceneNode, TransientMarker};

pub use glam::{Quat, Vec3};
