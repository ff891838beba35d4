//! Tooling primitives for the retriever agent.
//!
//! Trace events are plain data recorded during a tick through the brain's blackboard. Nothing is
//! recorded unless a [`TraceLog`] or a [`TraceSink`] has been installed, so production ticks pay
//! only for a map lookup.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{emit, TraceEvent, TraceLog, TraceSink, TRACE_LOG, TRACE_SINK};
