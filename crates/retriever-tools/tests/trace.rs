use retriever_core::Blackboard;
use retriever_tools::{emit, TraceEvent, TraceLog, TraceSink, TRACE_LOG, TRACE_SINK};

#[test]
fn emit_is_a_no_op_without_a_log() {
    let mut bb = Blackboard::new();
    emit(&mut bb, TraceEvent::new(0, "fetch.pickup"));
    assert!(bb.is_empty());
}

#[test]
fn emit_records_into_log_and_counts_by_tag() {
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());

    emit(&mut bb, TraceEvent::new(3, "fetch.pickup").with_object(7));
    emit(&mut bb, TraceEvent::new(3, "fetch.drop").with_object(7));
    emit(&mut bb, TraceEvent::new(9, "fetch.pickup").with_object(8).with_value(0.4));

    let log = bb.get(TRACE_LOG).unwrap();
    assert_eq!(log.count("fetch.pickup"), 2);
    assert_eq!(log.tags_at(3), vec!["fetch.pickup", "fetch.drop"]);
    let last = log.with_tag("fetch.pickup").last().unwrap();
    assert_eq!(last.object, Some(8));
    assert_eq!(last.value, 0.4);
}

struct CountingSink(std::rc::Rc<std::cell::Cell<usize>>);

impl TraceSink for CountingSink {
    fn emit(&mut self, _event: TraceEvent) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn emit_streams_into_installed_sink() {
    let seen = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut bb = Blackboard::new();
    bb.set(TRACE_SINK, Box::new(CountingSink(seen.clone())) as Box<dyn TraceSink>);

    emit(&mut bb, TraceEvent::new(1, "bt.sequence.resume"));
    emit(&mut bb, TraceEvent::new(2, "bt.sequence.resume"));
    assert_eq!(seen.get(), 2);
}

#[test]
fn sink_and_log_both_receive_events() {
    let seen = std::rc::Rc::new(std::cell::Cell::new(0));
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());
    bb.set(TRACE_SINK, Box::new(CountingSink(seen.clone())) as Box<dyn TraceSink>);

    emit(&mut bb, TraceEvent::new(5, "fetch.dispose").with_object(2));
    assert_eq!(seen.get(), 1);
    assert_eq!(bb.get(TRACE_LOG).unwrap().count("fetch.dispose"), 1);
}
