use retriever_core::{Blackboard, TickContext, WorldMut};
use retriever_tools::{emit as trace_emit, TraceEvent};

use crate::bt::{BtNode, BtStatus};

/// Children plus the index a paused composite picks up from.
struct Resumable<W: WorldMut> {
    children: Vec<Box<dyn BtNode<W>>>,
    index: usize,
}

impl<W: WorldMut> Resumable<W> {
    fn new(children: Vec<Box<dyn BtNode<W>>>) -> Self {
        Self { children, index: 0 }
    }

    /// Tick from the resume index while children return `advance`. `Running` pauses; any other
    /// status ends the composite with that status. Running off the end yields `advance`.
    fn run(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
        advance: BtStatus,
        resume_tag: &'static str,
    ) -> BtStatus {
        if self.index > 0 {
            trace_emit(
                blackboard,
                TraceEvent::new(ctx.tick, resume_tag).with_value(self.index as f32),
            );
        }

        let outcome = loop {
            let Some(child) = self.children.get_mut(self.index) else {
                break advance;
            };
            match child.tick(ctx, world, blackboard) {
                BtStatus::Running => return BtStatus::Running,
                status if status == advance => self.index += 1,
                status => break status,
            }
        };
        self.reset();
        outcome
    }

    fn reset(&mut self) {
        self.index = 0;
        self.children.iter_mut().for_each(|child| child.reset());
    }
}

/// Ticks children in order until one fails.
///
/// A child returning `Running` pauses the sequence; the next tick resumes at that child without
/// re-ticking the ones before it. Failure or completion rewinds to the first child.
pub struct Sequence<W: WorldMut>(Resumable<W>);

impl<W: WorldMut> Sequence<W> {
    pub fn new(children: Vec<Box<dyn BtNode<W>>>) -> Self {
        Self(Resumable::new(children))
    }

    /// Index the next tick will start from.
    pub fn resume_index(&self) -> usize {
        self.0.index
    }
}

impl<W: WorldMut> BtNode<W> for Sequence<W> {
    fn tick(&mut self, ctx: &TickContext, world: &mut W, blackboard: &mut Blackboard) -> BtStatus {
        self.0.run(ctx, world, blackboard, BtStatus::Success, "bt.sequence.resume")
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

/// Ticks children in order until one succeeds.
///
/// Shares the sequence's resume discipline. Success rewinds to the first child so the next
/// tick re-checks higher-priority branches; exhausting every child returns `Failure`.
pub struct Selector<W: WorldMut>(Resumable<W>);

impl<W: WorldMut> Selector<W> {
    pub fn new(children: Vec<Box<dyn BtNode<W>>>) -> Self {
        Self(Resumable::new(children))
    }

    pub fn resume_index(&self) -> usize {
        self.0.index
    }
}

impl<W: WorldMut> BtNode<W> for Selector<W> {
    fn tick(&mut self, ctx: &TickContext, world: &mut W, blackboard: &mut Blackboard) -> BtStatus {
        self.0.run(ctx, world, blackboard, BtStatus::Failure, "bt.selector.resume")
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

/// Side-effect-free predicate leaf. Never returns `Running`.
pub struct Condition<F> {
    name: &'static str,
    cond: F,
}

impl<F> Condition<F> {
    pub fn new(name: &'static str, cond: F) -> Self {
        Self { name, cond }
    }
}

impl<F, W> BtNode<W> for Condition<F>
where
    F: FnMut(&TickContext, &W, &Blackboard) -> bool + 'static,
    W: WorldMut,
{
    fn tick(&mut self, ctx: &TickContext, world: &mut W, blackboard: &mut Blackboard) -> BtStatus {
        let status = BtStatus::from_bool((self.cond)(ctx, &*world, &*blackboard));
        trace_emit(
            blackboard,
            TraceEvent::new(ctx.tick, self.name).with_value(status.code()),
        );
        status
    }

    fn reset(&mut self) {}
}

/// Action leaf: a per-tick function that may mutate the world and may span several frames by
/// returning `Running`.
pub struct RunAction<F> {
    name: &'static str,
    act: F,
}

impl<F> RunAction<F> {
    pub fn new(name: &'static str, act: F) -> Self {
        Self { name, act }
    }
}

impl<F, W> BtNode<W> for RunAction<F>
where
    F: FnMut(&TickContext, &mut W, &mut Blackboard) -> BtStatus + 'static,
    W: WorldMut,
{
    fn tick(&mut self, ctx: &TickContext, world: &mut W, blackboard: &mut Blackboard) -> BtStatus {
        let status = (self.act)(ctx, world, blackboard);
        trace_emit(
            blackboard,
            TraceEvent::new(ctx.tick, self.name).with_value(status.code()),
        );
        status
    }

    fn reset(&mut self) {}
}
