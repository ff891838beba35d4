//! Autonomous fetch agent.
//!
//! A retriever watches the live set of thrown balls, picks one with a hysteresis heuristic,
//! runs to it, carries it back and drops it, then looks for the next one. Decision making is a
//! fixed behavior tree ([`AgentBrain`]) ticked once per frame against a [`FetchWorld`], which
//! owns the arena, scene graph, physics world, live objects and the [`AgentBody`].
//!
//! ```no_run
//! use retriever_agent::{AgentBrain, FetchConfig, FetchWorld, FrameContext};
//! use retriever_core::TickContext;
//!
//! let mut world = FetchWorld::new(FetchConfig::default());
//! let mut brain = AgentBrain::new();
//! let mut ctx = TickContext::default();
//! for _ in 0..600 {
//!     world.step(ctx.dt_seconds);
//!     brain.update(&ctx, &mut world, FrameContext::default());
//!     ctx = ctx.next(ctx.dt_seconds);
//! }
//! ```

#![forbid(unsafe_code)]

pub mod arena;
pub mod body;
pub mod brain;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod nodes;
pub mod objects;
pub mod rig;
pub mod targeting;
pub mod throw;
pub mod world;

pub use arena::Arena;
pub use body::{AgentBody, DropReport};
pub use brain::{AgentBrain, FrameContext, DROP_POSITION, PLAYER_FORWARD, PLAYER_POSITION, TARGET};
pub use config::{
    AgentConfig, ArenaConfig, DropConfig, DropPolicy, FetchConfig, PhysicsConfig, ReturnTo,
    ThrowConfig,
};
pub use error::ConfigError;
pub use lifecycle::{carry_offset, ObjectLifecycle};
pub use objects::{BallKind, ObjectId, ObjectRegistry, Ownership, ThrowableObject};
pub use rig::AgentRig;
pub use targeting::{select_target, Candidate, TargetChoice};
pub use throw::Thrower;
pub use world::{arena_physics, FetchStats, FetchWorld};
