use retriever_core::{Blackboard, TickContext, WorldMut};

use crate::bt::{BtNode, BtStatus};

/// Owns a root node and ticks it once per frame.
pub struct BehaviorTree<W>
where
    W: WorldMut,
{
    root: Box<dyn BtNode<W>>,
    last: BtStatus,
}

impl<W> BehaviorTree<W>
where
    W: WorldMut,
{
    pub fn new(root: Box<dyn BtNode<W>>) -> Self {
        Self {
            root,
            last: BtStatus::Running,
        }
    }

    pub fn last_status(&self) -> BtStatus {
        self.last
    }

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        self.last = self.root.tick(ctx, world, blackboard);
        if self.last.is_done() {
            self.root.reset();
        }
        self.last
    }

    pub fn reset(&mut self) {
        self.root.reset();
        self.last = BtStatus::Running;
    }
}
