use retriever_core::{Blackboard, TickContext, WorldMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BtStatus {
    Running,
    Success,
    Failure,
}

impl BtStatus {
    pub fn from_bool(ok: bool) -> Self {
        if ok {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }

    pub fn is_done(self) -> bool {
        self != BtStatus::Running
    }

    /// Stable numeric code used in trace payloads.
    pub fn code(self) -> f32 {
        match self {
            BtStatus::Success => 0.0,
            BtStatus::Failure => 1.0,
            BtStatus::Running => 2.0,
        }
    }
}

/// A tickable tree node.
///
/// `tick` is called at most once per frame and must never block: long actions return
/// [`BtStatus::Running`] and are re-entered on a later frame.
pub trait BtNode<W>: 'static
where
    W: WorldMut,
{
    fn tick(&mut self, ctx: &TickContext, world: &mut W, blackboard: &mut Blackboard) -> BtStatus;

    /// Forget any resume state.
    fn reset(&mut self);
}
