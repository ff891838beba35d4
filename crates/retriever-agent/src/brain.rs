//! The fetch brain: a fixed behavior tree plus the blackboard it shares across ticks.
//!
//! ```text
//! Selector
//! ├── Sequence                      have work
//! │   ├── HasWork
//! │   └── Selector
//! │       ├── Sequence              carrying
//! │       │   ├── IsCarrying
//! │       │   ├── ReturnHome
//! │       │   ├── DropBall
//! │       │   └── AutoFetchNext
//! │       └── Sequence              seeking
//! │           ├── FindOrRefreshTarget
//! │           ├── SeekBall
//! │           ├── PickupBall
//! │           ├── ReturnHome
//! │           ├── DropBall
//! │           └── AutoFetchNext
//! └── Idle
//! ```

use glam::Vec3;
use retriever_bt::{BehaviorTree, BtNode, BtStatus, Selector, Sequence};
use retriever_core::{BbKey, Blackboard, TickContext};
use retriever_sim::{PhysicsWorld, RapierWorld};
use retriever_tools::{TraceLog, TRACE_LOG};

use crate::nodes;
use crate::objects::ObjectId;
use crate::world::FetchWorld;

pub const TARGET: BbKey<ObjectId> = BbKey::named(0x7E7C_5000_0000_0001, "fetch.target");
pub const PLAYER_POSITION: BbKey<Vec3> =
    BbKey::named(0x7E7C_5000_0000_0002, "fetch.player_position");
/// Camera look direction.
pub const PLAYER_FORWARD: BbKey<Vec3> = BbKey::named(0x7E7C_5000_0000_0003, "fetch.player_forward");
/// Last destination computed by ReturnHome.
pub const DROP_POSITION: BbKey<Vec3> = BbKey::named(0x7E7C_5000_0000_0004, "fetch.drop_position");

/// Per-frame inputs from outside the world (player and camera).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameContext {
    pub player_position: Option<Vec3>,
    pub player_forward: Option<Vec3>,
}

impl FrameContext {
    pub fn player(position: Vec3, forward: Vec3) -> Self {
        Self {
            player_position: Some(position),
            player_forward: Some(forward),
        }
    }
}

pub fn build_tree<P: PhysicsWorld>() -> Box<dyn BtNode<FetchWorld<P>>> {
    let carrying: Box<dyn BtNode<FetchWorld<P>>> = Box::new(Sequence::new(vec![
        nodes::is_carrying(),
        nodes::return_home(),
        nodes::drop_ball(),
        nodes::auto_fetch_next(),
    ]));
    let seeking: Box<dyn BtNode<FetchWorld<P>>> = Box::new(Sequence::new(vec![
        nodes::find_or_refresh_target(),
        nodes::seek_ball(),
        nodes::pickup_ball(),
        nodes::return_home(),
        nodes::drop_ball(),
        nodes::auto_fetch_next(),
    ]));
    let work: Box<dyn BtNode<FetchWorld<P>>> = Box::new(Selector::new(vec![carrying, seeking]));
    let have_work: Box<dyn BtNode<FetchWorld<P>>> =
        Box::new(Sequence::new(vec![nodes::has_work(), work]));
    Box::new(Selector::new(vec![have_work, nodes::idle()]))
}

pub struct AgentBrain<P: PhysicsWorld = RapierWorld> {
    tree: BehaviorTree<FetchWorld<P>>,
    blackboard: Blackboard,
}

impl<P: PhysicsWorld> Default for AgentBrain<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: PhysicsWorld> AgentBrain<P> {
    pub fn new() -> Self {
        Self {
            tree: BehaviorTree::new(build_tree()),
            blackboard: Blackboard::new(),
        }
    }

    /// Record every node status and fetch event into an in-memory [`TraceLog`].
    pub fn with_trace(mut self) -> Self {
        self.blackboard.set(TRACE_LOG, TraceLog::default());
        self
    }

    pub fn trace(&self) -> Option<&TraceLog> {
        self.blackboard.get(TRACE_LOG)
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.blackboard.get_copied(TARGET)
    }

    pub fn last_status(&self) -> BtStatus {
        self.tree.last_status()
    }

    /// Run one tick of the tree. Call after the world's physics step for the frame.
    pub fn update(
        &mut self,
        ctx: &TickContext,
        world: &mut FetchWorld<P>,
        frame: FrameContext,
    ) -> BtStatus {
        self.blackboard.set_opt(PLAYER_POSITION, frame.player_position);
        self.blackboard.set_opt(PLAYER_FORWARD, frame.player_forward);
        self.tree.tick(ctx, world, &mut self.blackboard)
    }
}
