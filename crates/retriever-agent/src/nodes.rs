//! Leaf nodes of the fetch tree.
//!
//! Each function builds one boxed node. Conditions only read the world; actions steer the agent
//! and move objects through the lifecycle bridge. Stale references (a target that was disposed
//! or is about to fall) turn into `Failure` so the tree re-plans on the next tick.

use glam::Vec3;
use retriever_bt::{BtNode, BtStatus, Condition, RunAction};
use retriever_core::{Blackboard, TickContext};
use retriever_sim::PhysicsWorld;
use retriever_tools::{emit as trace_emit, TraceEvent};
use tracing::debug;

use crate::arena;
use crate::body::{IDLE_CLIP, RUN_CLIP};
use crate::brain::{DROP_POSITION, PLAYER_FORWARD, PLAYER_POSITION, TARGET};
use crate::config::ReturnTo;
use crate::objects::ObjectId;
use crate::targeting::TargetChoice;
use crate::world::FetchWorld;

type Node<P> = Box<dyn BtNode<FetchWorld<P>>>;

/// Camera forward assumed when the frame does not provide one.
const DEFAULT_PLAYER_FORWARD: Vec3 = Vec3::NEG_Z;

pub fn has_work<P: PhysicsWorld>() -> Node<P> {
    Box::new(Condition::new(
        "fetch.has_work",
        |_: &TickContext, world: &FetchWorld<P>, bb: &Blackboard| {
            world.agent.is_carrying() || bb.contains(TARGET) || !world.objects.is_empty()
        },
    ))
}

pub fn is_carrying<P: PhysicsWorld>() -> Node<P> {
    Box::new(Condition::new(
        "fetch.is_carrying",
        |_: &TickContext, world: &FetchWorld<P>, _: &Blackboard| world.agent.is_carrying(),
    ))
}

/// Run the heuristic and store the outcome under [`TARGET`].
fn refresh_target<P: PhysicsWorld>(
    ctx: &TickContext,
    world: &FetchWorld<P>,
    bb: &mut Blackboard,
) -> Option<ObjectId> {
    let choice = world.choose_next_target(bb.get_copied(TARGET));
    match choice {
        TargetChoice::Keep(id) => {
            trace_emit(
                bb,
                TraceEvent::new(ctx.tick, "fetch.target.keep").with_object(id.0),
            );
        }
        TargetChoice::Switch { from, to } => {
            let distance = world.distance_to(to).unwrap_or_default();
            debug!(object = to.0, previous = ?from.map(|f| f.0), distance, "target acquired");
            trace_emit(
                bb,
                TraceEvent::new(ctx.tick, "fetch.target.acquire")
                    .with_object(to.0)
                    .with_value(distance),
            );
        }
        TargetChoice::None => {}
    }
    let target = choice.target();
    bb.set_opt(TARGET, target);
    target
}

pub fn find_or_refresh_target<P: PhysicsWorld>() -> Node<P> {
    Box::new(RunAction::new(
        "fetch.find_target",
        |ctx: &TickContext, world: &mut FetchWorld<P>, bb: &mut Blackboard| {
            if world.agent.is_carrying() {
                return BtStatus::Success;
            }
            BtStatus::from_bool(refresh_target(ctx, world, bb).is_some())
        },
    ))
}

fn lost_target(ctx: &TickContext, bb: &mut Blackboard, id: ObjectId) -> BtStatus {
    trace_emit(
        bb,
        TraceEvent::new(ctx.tick, "fetch.target.lost").with_object(id.0),
    );
    BtStatus::Failure
}

pub fn seek_ball<P: PhysicsWorld>() -> Node<P> {
    Box::new(RunAction::new(
        "fetch.seek",
        |ctx: &TickContext, world: &mut FetchWorld<P>, bb: &mut Blackboard| {
            let Some(id) = bb.get_copied(TARGET) else {
                return BtStatus::Failure;
            };
            let Some(position) = world.object_position(id) else {
                debug!(object = id.0, "target vanished while seeking");
                return lost_target(ctx, bb, id);
            };
            if world.will_fall(id) {
                debug!(object = id.0, "target about to leave the arena");
                return lost_target(ctx, bb, id);
            }

            world.agent.play(RUN_CLIP);
            let speed = world.agent.run_speed;
            world.move_agent_towards(position, ctx.dt_seconds, speed);

            let reach = world.agent_position().distance(position);
            if reach < world.config.agent.pickup_radius {
                BtStatus::Success
            } else {
                BtStatus::Running
            }
        },
    ))
}

pub fn pickup_ball<P: PhysicsWorld>() -> Node<P> {
    Box::new(RunAction::new(
        "fetch.pickup_ball",
        |ctx: &TickContext, world: &mut FetchWorld<P>, bb: &mut Blackboard| {
            let Some(id) = bb.get_copied(TARGET) else {
                return BtStatus::Failure;
            };
            let Some(reach) = world.reach_distance(id) else {
                return lost_target(ctx, bb, id);
            };
            if reach > world.config.agent.pickup_guard {
                return BtStatus::Failure;
            }
            if !world.pickup(id) {
                return BtStatus::Failure;
            }
            trace_emit(
                bb,
                TraceEvent::new(ctx.tick, "fetch.pickup")
                    .with_object(id.0)
                    .with_value(reach),
            );
            BtStatus::Success
        },
    ))
}

pub fn return_home<P: PhysicsWorld>() -> Node<P> {
    Box::new(RunAction::new(
        "fetch.return_home",
        |ctx: &TickContext, world: &mut FetchWorld<P>, bb: &mut Blackboard| {
            let destination = match world.agent.return_to {
                ReturnTo::Home => world.agent.home,
                ReturnTo::Player => {
                    let Some(player) = bb.get_copied(PLAYER_POSITION) else {
                        return BtStatus::Failure;
                    };
                    let forward = bb
                        .get_copied(PLAYER_FORWARD)
                        .unwrap_or(DEFAULT_PLAYER_FORWARD);
                    player + forward * world.config.agent.player_drop_offset
                }
            };
            bb.set(DROP_POSITION, destination);

            world.agent.play(RUN_CLIP);
            let speed = world.agent.walk_speed * world.config.agent.return_speed_factor;
            world.move_agent_towards(destination, ctx.dt_seconds, speed);

            let distance = arena::distance(world.agent_position(), destination);
            if distance < world.config.agent.arrive_radius {
                BtStatus::Success
            } else {
                BtStatus::Running
            }
        },
    ))
}

pub fn drop_ball<P: PhysicsWorld>() -> Node<P> {
    Box::new(RunAction::new(
        "fetch.drop_ball",
        |ctx: &TickContext, world: &mut FetchWorld<P>, bb: &mut Blackboard| {
            if !world.agent.is_carrying() {
                return BtStatus::Success;
            }
            if let Some(report) = world.drop_carried() {
                trace_emit(
                    bb,
                    TraceEvent::new(ctx.tick, "fetch.drop")
                        .with_object(report.object.0)
                        .with_value(report.pose.position.y),
                );
                if report.disposed {
                    trace_emit(
                        bb,
                        TraceEvent::new(ctx.tick, "fetch.dispose").with_object(report.object.0),
                    );
                }
            }
            bb.remove(TARGET);
            BtStatus::Success
        },
    ))
}

pub fn auto_fetch_next<P: PhysicsWorld>() -> Node<P> {
    Box::new(RunAction::new(
        "fetch.auto_fetch_next",
        |ctx: &TickContext, world: &mut FetchWorld<P>, bb: &mut Blackboard| {
            refresh_target(ctx, world, bb);
            BtStatus::Success
        },
    ))
}

pub fn idle<P: PhysicsWorld>() -> Node<P> {
    Box::new(RunAction::new(
        "fetch.idle",
        |_: &TickContext, world: &mut FetchWorld<P>, bb: &mut Blackboard| {
            world.agent.play(IDLE_CLIP);
            if let Some(player) = bb.get_copied(PLAYER_POSITION) {
                let blend = world.config.agent.idle_turn_blend;
                world.face_agent_towards(player, blend);
            }
            BtStatus::Success
        },
    ))
}
