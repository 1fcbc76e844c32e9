//! Survival Core - headless runner
//!
//! Drives a single survivor through a stretch of game time at a fixed
//! frame rate, with hourly random pickups and scheduled meals, and prints
//! the final state.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use survival_core::core::error::Result;
use survival_core::core::types::{GaitMode, ParameterKind};
use survival_core::core::SurvivalConfig;
use survival_core::simulation::{run_frame, SimulationEvent, Survivor, SurvivorSnapshot};
use survival_core::stats::ParameterEvent;
use survival_core::time::{hours, minutes, ClockReading, Process, TimeContext};

#[derive(Parser, Debug)]
#[command(name = "survival-core")]
#[command(about = "Run a headless survivor simulation and report the outcome")]
struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Game hours to simulate
    #[arg(long, default_value_t = 48)]
    hours: u64,

    /// Frames per real second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Initial carried load
    #[arg(long, default_value_t = 0.0)]
    load: f32,

    /// Run instead of walk
    #[arg(long)]
    run: bool,

    /// Start with a speed-up window of this many game minutes
    #[arg(long)]
    speed_up_minutes: Option<u64>,

    /// Game hours between scheduled meals (0 disables)
    #[arg(long, default_value_t = 6)]
    meal_interval: u64,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
enum Chore {
    Eat,
    Drink,
}

#[derive(Serialize)]
struct Summary {
    ended_at: ClockReading,
    alive: bool,
    frames: u64,
    processes_fired: usize,
    zero_crossings: usize,
    died_at: Option<ClockReading>,
    survivor: SurvivorSnapshot,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("survival_core=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SurvivalConfig::load_from_toml(path)?,
        None => SurvivalConfig::default(),
    };

    let mut time = TimeContext::new();
    let start = time.install_clock(&config.time)?.time();
    let end = start + hours(args.hours);

    let mut survivor = Survivor::from_config(&config)?;
    survivor.pick_up(args.load)?;
    if args.run {
        survivor.set_gait(GaitMode::Run)?;
    }
    survivor.start_moving()?;

    if let Some(length) = args.speed_up_minutes {
        time.start_speed_up(minutes(length))?;
    }

    // Scheduled meals push chores that are applied after the frame
    let chores: Rc<RefCell<VecDeque<Chore>>> = Rc::new(RefCell::new(VecDeque::new()));
    if args.meal_interval > 0 {
        let mut meal_at = start;
        while meal_at + hours(args.meal_interval) <= end {
            meal_at += hours(args.meal_interval);
            for chore in [Chore::Eat, Chore::Drink] {
                let queue = Rc::clone(&chores);
                time.add_process(Process::new(
                    format!("{:?}", chore),
                    start,
                    meal_at,
                    move |_| queue.borrow_mut().push_back(chore),
                ))?;
            }
        }
    }

    // Hourly chance of picking something up
    let hours_passed = Rc::new(RefCell::new(0u32));
    {
        let counter = Rc::clone(&hours_passed);
        time.clock_mut()?
            .on_hour_changed
            .subscribe(move |_| *counter.borrow_mut() += 1);
    }

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let frame_seconds = 1.0 / f64::from(args.fps.max(1));
    let mut summary_events = Vec::new();
    let mut frames = 0u64;

    while time.clock()?.time() < end {
        let events = run_frame(&mut time, &mut survivor, frame_seconds)?;
        frames += 1;
        let died = events
            .iter()
            .any(|e| matches!(e, SimulationEvent::Died { .. }));
        summary_events.extend(events);
        if died {
            break;
        }

        while let Some(chore) = chores.borrow_mut().pop_front() {
            match chore {
                Chore::Eat => survivor.restore(ParameterKind::Food, 35.0)?,
                Chore::Drink => survivor.restore(ParameterKind::Water, 50.0)?,
            };
        }

        let pickups = std::mem::take(&mut *hours_passed.borrow_mut());
        for _ in 0..pickups {
            if rng.gen_bool(0.3) {
                survivor.pick_up(rng.gen_range(1.0..5.0))?;
            } else if survivor.vitals.get(ParameterKind::Capacity)?.current() > 0.0
                && rng.gen_bool(0.2)
            {
                survivor.put_down(rng.gen_range(1.0..5.0))?;
            }
        }
    }

    let summary = Summary {
        ended_at: time.clock()?.reading(),
        alive: survivor.is_alive(),
        frames,
        processes_fired: summary_events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::ProcessFired { .. }))
            .count(),
        zero_crossings: summary_events
            .iter()
            .filter(|e| match e {
                SimulationEvent::Parameter { event, .. } => matches!(
                    event,
                    ParameterEvent::ReachedZero(_) | ParameterEvent::RecoveredFromZero(_)
                ),
                _ => false,
            })
            .count(),
        died_at: summary_events.iter().find_map(|e| match e {
            SimulationEvent::Died { at } => Some(*at),
            _ => None,
        }),
        survivor: survivor.snapshot(),
    };

    survivor.teardown();
    time.teardown_clock();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== SURVIVAL CORE ===");
    println!(
        "Ended at day {} {:02}:{:02} after {} frames",
        summary.ended_at.day, summary.ended_at.hour, summary.ended_at.minute, summary.frames
    );
    match summary.died_at {
        Some(at) => println!("Died at day {} {:02}:{:02}", at.day, at.hour, at.minute),
        None => println!("Survived"),
    }
    println!("Processes fired: {}", summary.processes_fired);
    println!();
    for p in &summary.survivor.parameters {
        println!(
            "  {:<9} {:>7.1} / {:>6.1}  ({:+.2}/h)",
            p.kind.to_string(),
            p.current,
            p.max,
            p.change_rate
        );
    }
    println!();
    println!(
        "Movement: {:?} {:?} at {:.2} u/s (walk={}, run={}, jump={})",
        summary.survivor.gait,
        summary.survivor.movement,
        summary.survivor.speed,
        summary.survivor.can_walk,
        summary.survivor.can_run,
        summary.survivor.can_jump
    );
    if !summary.survivor.health_drained_by.is_empty() {
        println!("Health drained by: {:?}", summary.survivor.health_drained_by);
    }

    Ok(())
}
