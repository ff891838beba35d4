use retriever_bt::{BehaviorTree, BtNode, BtStatus, Condition, RunAction, Selector, Sequence};
use retriever_core::{Blackboard, TickContext, WorldMut, WorldView};
use retriever_tools::{TraceLog, TRACE_LOG};

#[derive(Debug, Default)]
struct ScriptedWorld {
    script: Vec<BtStatus>,
    ticked: Vec<usize>,
}

impl WorldView for ScriptedWorld {}
impl WorldMut for ScriptedWorld {}

impl ScriptedWorld {
    fn new(script: Vec<BtStatus>) -> Self {
        Self {
            script,
            ticked: Vec::new(),
        }
    }

    fn take_ticked(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.ticked)
    }
}

fn scripted(i: usize) -> Box<dyn BtNode<ScriptedWorld>> {
    Box::new(RunAction::new(
        "scripted",
        move |_: &TickContext, w: &mut ScriptedWorld, _: &mut Blackboard| {
            w.ticked.push(i);
            w.script[i]
        },
    ))
}

fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 1.0 / 60.0, tick as f32 / 60.0, 0)
}

#[test]
fn sequence_resumes_at_running_child() {
    use BtStatus::*;
    let mut world = ScriptedWorld::new(vec![Success, Success, Running, Success, Success]);
    let mut seq = Sequence::new((0..5).map(scripted).collect());
    let mut bb = Blackboard::new();

    assert_eq!(seq.tick(&ctx(0), &mut world, &mut bb), Running);
    assert_eq!(world.take_ticked(), vec![0, 1, 2]);
    assert_eq!(seq.resume_index(), 2);

    world.script[2] = Success;
    assert_eq!(seq.tick(&ctx(1), &mut world, &mut bb), Success);
    assert_eq!(world.take_ticked(), vec![2, 3, 4]);
    assert_eq!(seq.resume_index(), 0);
}

#[test]
fn sequence_failure_rewinds_to_first_child() {
    use BtStatus::*;
    let mut world = ScriptedWorld::new(vec![Success, Running, Success]);
    let mut seq = Sequence::new((0..3).map(scripted).collect());
    let mut bb = Blackboard::new();

    assert_eq!(seq.tick(&ctx(0), &mut world, &mut bb), Running);
    world.script[1] = Failure;
    assert_eq!(seq.tick(&ctx(1), &mut world, &mut bb), Failure);
    assert_eq!(seq.resume_index(), 0);

    world.take_ticked();
    world.script[1] = Success;
    assert_eq!(seq.tick(&ctx(2), &mut world, &mut bb), Success);
    assert_eq!(world.take_ticked(), vec![0, 1, 2]);
}

#[test]
fn selector_success_rescans_from_first_child() {
    use BtStatus::*;
    let mut world = ScriptedWorld::new(vec![Failure, Running, Success]);
    let mut sel = Selector::new((0..3).map(scripted).collect());
    let mut bb = Blackboard::new();

    assert_eq!(sel.tick(&ctx(0), &mut world, &mut bb), Running);
    assert_eq!(world.take_ticked(), vec![0, 1]);

    // Resumes at the running child; child 0 is not re-checked.
    world.script[1] = Success;
    assert_eq!(sel.tick(&ctx(1), &mut world, &mut bb), Success);
    assert_eq!(world.take_ticked(), vec![1]);

    // After a success the scan starts over.
    assert_eq!(sel.tick(&ctx(2), &mut world, &mut bb), Success);
    assert_eq!(world.take_ticked(), vec![0, 1]);
}

#[test]
fn selector_exhausted_returns_failure() {
    use BtStatus::*;
    let mut world = ScriptedWorld::new(vec![Failure, Failure]);
    let mut sel = Selector::new((0..2).map(scripted).collect());
    let mut bb = Blackboard::new();

    assert_eq!(sel.tick(&ctx(0), &mut world, &mut bb), Failure);
    assert_eq!(world.take_ticked(), vec![0, 1]);
    assert_eq!(sel.resume_index(), 0);
}

#[test]
fn condition_never_runs_and_traces_its_name() {
    let mut world = ScriptedWorld::default();
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());

    let mut cond = Condition::new(
        "is_empty",
        |_: &TickContext, w: &ScriptedWorld, _: &Blackboard| w.script.is_empty(),
    );
    assert_eq!(cond.tick(&ctx(4), &mut world, &mut bb), BtStatus::Success);
    world.script.push(BtStatus::Running);
    assert_eq!(cond.tick(&ctx(5), &mut world, &mut bb), BtStatus::Failure);

    let log = bb.get(TRACE_LOG).unwrap();
    assert_eq!(log.count("is_empty"), 2);
}

#[test]
fn tree_resets_root_when_done_and_traces_resume() {
    use BtStatus::*;
    let mut world = ScriptedWorld::new(vec![Success, Running]);
    let root = Sequence::new((0..2).map(scripted).collect());
    let mut tree = BehaviorTree::new(Box::new(root));
    let mut bb = Blackboard::new();
    bb.set(TRACE_LOG, TraceLog::default());

    assert_eq!(tree.tick(&ctx(0), &mut world, &mut bb), Running);
    assert_eq!(tree.tick(&ctx(1), &mut world, &mut bb), Running);
    assert_eq!(bb.get(TRACE_LOG).unwrap().count("bt.sequence.resume"), 1);

    world.script[1] = Success;
    assert_eq!(tree.tick(&ctx(2), &mut world, &mut bb), Success);
    assert_eq!(tree.last_status(), Success);

    world.take_ticked();
    tree.tick(&ctx(3), &mut world, &mut bb);
    assert_eq!(world.take_ticked(), vec![0, 1]);
}
