//! Retriever CLI - headless fetch loop.
//!
//! - `retriever run` - step the arena at 60 Hz, throwing seeded random balls for the agent
//! - `retriever kinds` - list the ball kinds a throw can use

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use retriever_agent::{AgentBrain, BallKind, FetchConfig, FetchWorld, FrameContext, Thrower};
use retriever_core::{DeterministicRng, SplitMix64, TickContext};
use retriever_sim::{Quat, Vec3};
use retriever_tools::{TraceEvent, TraceSink, TRACE_SINK};

const DT: f32 = 1.0 / 60.0;

/// RNG stream the throws draw from, see [`TickContext::rng`].
const THROW_STREAM: u64 = 0x7468_726f_77;

/// Where the simulated player stands and throws from.
const PLAYER_POSITION: Vec3 = Vec3::new(0.0, 1.6, 6.0);

#[derive(Parser)]
#[command(name = "retriever")]
#[command(about = "Autonomous fetch agent, headless", version)]
struct Cli {
    /// YAML config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fetch loop
    Run {
        /// Number of 60 Hz frames to simulate
        #[arg(long, default_value_t = 3600)]
        ticks: u64,

        /// Seed for throws
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Throw a new ball every N frames (0 disables throwing)
        #[arg(long, default_value_t = 240)]
        throw_every: u64,

        /// Ball kind to throw (random when omitted)
        #[arg(long)]
        kind: Option<String>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List ball kinds
    Kinds,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            ticks,
            seed,
            throw_every,
            kind,
            json,
        } => {
            let config = FetchConfig::load_or_default(cli.config.as_deref()).with_context(|| {
                match &cli.config {
                    Some(path) => format!("Failed to load config from {}", path.display()),
                    None => "Invalid default config".to_string(),
                }
            })?;
            let options = RunOptions {
                ticks,
                seed,
                throw_every,
                kind: kind.as_deref().map(parse_kind).transpose()?,
                json,
            };
            run(config, options)
        }
        Commands::Kinds => {
            list_kinds();
            Ok(())
        }
    }
}

struct RunOptions {
    ticks: u64,
    seed: u64,
    throw_every: u64,
    kind: Option<BallKind>,
    json: bool,
}

fn parse_kind(name: &str) -> Result<BallKind> {
    let kind = BallKind::from_name(name);
    if kind.name() != name.to_ascii_lowercase() {
        bail!(
            "Unknown ball kind '{name}' (expected one of: {})",
            BallKind::ALL.map(BallKind::name).join(", ")
        );
    }
    Ok(kind)
}

/// Counts `fetch.*` events (target switches, losses, transfers) streamed out of the brain.
#[derive(Clone, Default)]
struct FetchEventCounter(Rc<RefCell<BTreeMap<String, u64>>>);

impl FetchEventCounter {
    fn get(&self, tag: &str) -> u64 {
        self.0.borrow().get(tag).copied().unwrap_or(0)
    }
}

impl TraceSink for FetchEventCounter {
    fn emit(&mut self, event: TraceEvent) {
        const COUNTED: [&str; 5] = [
            "fetch.target.acquire",
            "fetch.target.lost",
            "fetch.pickup",
            "fetch.drop",
            "fetch.dispose",
        ];
        if COUNTED.contains(&event.tag.as_ref()) {
            *self.0.borrow_mut().entry(event.tag.into_owned()).or_default() += 1;
        }
    }
}

fn run(config: FetchConfig, options: RunOptions) -> Result<()> {
    let thrower = Thrower::new(config.throw.clone());
    let mut world = FetchWorld::new(config);
    let mut brain = AgentBrain::new();
    let events = FetchEventCounter::default();
    brain
        .blackboard_mut()
        .set(TRACE_SINK, Box::new(events.clone()) as Box<dyn TraceSink>);
    let mut ctx = TickContext::new(0, DT, 0.0, options.seed);
    let frame = FrameContext::player(PLAYER_POSITION, Vec3::NEG_Z);

    info!(
        ticks = options.ticks,
        seed = options.seed,
        throw_every = options.throw_every,
        "starting fetch loop"
    );

    let mut thrown = 0u64;
    for _ in 0..options.ticks {
        let tick = ctx.tick;
        if options.throw_every > 0 && tick % options.throw_every == 0 {
            let mut rng = ctx.rng(THROW_STREAM);
            let kind = options
                .kind
                .unwrap_or_else(|| BallKind::ALL[rng.next_index(BallKind::ALL.len())]);
            let (direction, charge) = random_throw(&mut rng);
            if let Some(id) = thrower.throw(&mut world, kind, PLAYER_POSITION, direction, charge) {
                thrown += 1;
                info!(tick, object = id.0, kind = kind.name(), charge, "ball thrown");
            }
        }

        world.step(DT);
        brain.update(&ctx, &mut world, frame);
        ctx = ctx.next(DT);
    }

    print_summary(&world, &brain, &events, &options, thrown)
}

/// A throw roughly toward the arena centre: yaw within ±0.5 rad of -Z, slight upward pitch.
fn random_throw(rng: &mut SplitMix64) -> (Vec3, f32) {
    let yaw = rng.next_f32_range(-0.5, 0.5);
    let pitch = rng.next_f32_range(0.05, 0.35);
    let direction = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch) * Vec3::NEG_Z;
    let charge = rng.next_f32_range(0.0, 1.5);
    (direction, charge)
}

fn print_summary(
    world: &FetchWorld,
    brain: &AgentBrain,
    events: &FetchEventCounter,
    options: &RunOptions,
    thrown: u64,
) -> Result<()> {
    let stats = world.stats;
    let agent = world.agent_position();

    if options.json {
        let summary = serde_json::json!({
            "ticks": options.ticks,
            "seed": options.seed,
            "seconds": world.now(),
            "thrown": thrown,
            "pickups": stats.pickups,
            "drops": stats.drops,
            "disposed": stats.disposed,
            "culled": stats.culled,
            "retargets": events.get("fetch.target.acquire"),
            "targets_lost": events.get("fetch.target.lost"),
            "live": world.objects.len(),
            "carrying": world.agent.carrying().map(|id| id.0),
            "target": brain.target().map(|id| id.0),
            "agent": [agent.x, agent.y, agent.z],
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Fetch run ({} ticks, seed {})", options.ticks, options.seed);
    println!("  Simulated: {:.1}s", world.now());
    println!("  Thrown:    {}", thrown);
    println!("  Fetched:   {} picked up, {} dropped", stats.pickups, stats.drops);
    println!("  Disposed:  {} after drop, {} fell off", stats.disposed, stats.culled);
    println!(
        "  Targets:   {} acquired, {} lost",
        events.get("fetch.target.acquire"),
        events.get("fetch.target.lost")
    );
    println!("  Live:      {}", world.objects.len());
    match (world.agent.carrying(), brain.target()) {
        (Some(id), _) => println!("  Agent:     carrying {id}"),
        (None, Some(id)) => println!("  Agent:     chasing {id}"),
        (None, None) => println!("  Agent:     idle"),
    }
    println!(
        "  Position:  ({:.2}, {:.2}, {:.2})",
        agent.x, agent.y, agent.z
    );
    Ok(())
}

fn list_kinds() {
    println!("Ball kinds:");
    for kind in BallKind::ALL {
        println!(
            "  {:<10} radius {:.2}  mass {:>4.1}  restitution {:.1}",
            kind.name(),
            kind.radius(),
            kind.mass(),
            kind.restitution()
        );
    }
}
