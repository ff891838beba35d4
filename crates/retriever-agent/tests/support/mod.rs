#![allow(dead_code)]

use retriever_agent::{arena_physics, AgentBrain, AgentRig, FetchConfig, FetchWorld, FrameContext};
use retriever_bt::BtStatus;
use retriever_core::TickContext;
use retriever_sim::{BodyDesc, BodyHandle, PhysicsWorld, Pose, RapierWorld, Vec3};

/// Physics wrapper that remembers every body created and removed.
pub struct RecordingPhysics {
    inner: RapierWorld,
    pub created: Vec<(BodyHandle, BodyDesc)>,
    pub removed: Vec<BodyHandle>,
}

impl RecordingPhysics {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            inner: arena_physics(config),
            created: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl PhysicsWorld for RecordingPhysics {
    fn step(&mut self, dt: f32) {
        self.inner.step(dt);
    }

    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = self.inner.create_body(desc);
        self.created.push((handle, desc));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let removed = self.inner.remove_body(handle);
        if removed {
            self.removed.push(handle);
        }
        removed
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.inner.contains(handle)
    }

    fn pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.inner.pose(handle)
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.inner.linear_velocity(handle)
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> bool {
        self.inner.set_linear_velocity(handle, velocity)
    }

    fn body_count(&self) -> usize {
        self.inner.body_count()
    }
}

pub fn recording_world(config: FetchConfig) -> FetchWorld<RecordingPhysics> {
    let physics = RecordingPhysics::new(&config);
    FetchWorld::with_parts(config, physics, &AgentRig::dog())
}

pub const DT: f32 = 1.0 / 60.0;

/// Drives world and brain in lockstep at 60 Hz.
pub struct Harness<P: PhysicsWorld> {
    pub world: FetchWorld<P>,
    pub brain: AgentBrain<P>,
    pub ctx: TickContext,
    pub input: FrameContext,
}

impl<P: PhysicsWorld> Harness<P> {
    pub fn new(world: FetchWorld<P>) -> Self {
        Self {
            world,
            brain: AgentBrain::new().with_trace(),
            ctx: TickContext::new(0, DT, 0.0, 7),
            input: FrameContext::default(),
        }
    }

    /// One frame: physics step, then one tree tick. Returns the tick index and status.
    pub fn frame(&mut self) -> (u64, BtStatus) {
        self.world.step(self.ctx.dt_seconds);
        let tick = self.ctx.tick;
        let status = self.brain.update(&self.ctx, &mut self.world, self.input);
        self.ctx = self.ctx.next(DT);
        (tick, status)
    }

    /// Run frames until `done` holds after a frame, up to `limit` frames.
    pub fn run_until(
        &mut self,
        limit: usize,
        mut done: impl FnMut(&FetchWorld<P>, &AgentBrain<P>) -> bool,
    ) -> Option<u64> {
        for _ in 0..limit {
            let (tick, _) = self.frame();
            if done(&self.world, &self.brain) {
                return Some(tick);
            }
        }
        None
    }

    pub fn tags_at(&self, tick: u64) -> Vec<String> {
        self.brain
            .trace()
            .map(|log| log.tags_at(tick).into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
