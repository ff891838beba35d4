//! Behavior tree runtime built on `retriever-core`.
//!
//! Composites remember the index of a child that returned [`BtStatus::Running`] and resume there
//! on the next tick instead of re-evaluating earlier siblings. Multi-frame actions therefore run
//! to completion (or failure) before higher-priority branches are looked at again, and a
//! selector that succeeds re-scans from its first child on the following tick.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod nodes;
pub mod tree;

pub use bt::{BtNode, BtStatus};
pub use nodes::{Condition, RunAction, Selector, Sequence};
pub use tree::BehaviorTree;
