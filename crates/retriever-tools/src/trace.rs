#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use retriever_core::{BbKey, Blackboard};

/// One recorded decision: which node or transfer fired on which tick.
///
/// `object` carries the id of the throwable involved (when there is one) and `value` a single
/// scalar payload such as a distance or a child index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub object: Option<u64>,
    pub value: f32,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            object: None,
            value: 0.0,
        }
    }

    pub fn with_object(mut self, object: u64) -> Self {
        self.object = Some(object);
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }
}

/// Streaming consumer, called for every emitted event before it is logged.
pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.tag == tag).count()
    }

    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |e| e.tag == tag)
    }

    pub fn tags_at(&self, tick: u64) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.tick == tick)
            .map(|e| e.tag.as_ref())
            .collect()
    }
}

/// Blackboard key for collecting events in-memory.
pub const TRACE_LOG: BbKey<TraceLog> = BbKey::named(0x7E7C_4000_0000_0001, "trace.log");
/// Blackboard key for streaming events into a user-provided sink.
pub const TRACE_SINK: BbKey<Box<dyn TraceSink>> =
    BbKey::named(0x7E7C_4000_0000_0002, "trace.sink");

pub fn emit(blackboard: &mut Blackboard, event: TraceEvent) {
    if let Some(sink) = blackboard.get_mut(TRACE_SINK) {
        sink.emit(event.clone());
    }
    if let Some(log) = blackboard.get_mut(TRACE_LOG) {
        log.push(event);
    }
}
