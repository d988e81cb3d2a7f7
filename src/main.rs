//! Mask Racer entry point
//!
//! Headless attract mode: both cars follow the track centreline on the
//! procedural loop until one side wins or the tick cap runs out, then a JSON
//! summary is printed to stdout. With `random` as the third argument the
//! opponent is handed to an untrained policy that picks actions at random.
//!
//! Usage: `mask-racer [config.json] [max_ticks] [follow|random]`

use std::process::ExitCode;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use mask_racer::sim::{
    BounceCause, Hud, LoopLayout, Observation, PathFollower, Policy, PolicyAction,
    PolicyController, RaceEvent, RacePhase, RaceState, Side, TickInput, tick,
};
use mask_racer::{ConfigError, RaceConfig};

/// Ten minutes of racing at the default tick rate
const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 10;

/// Who drives the opponent car
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum OpponentMode {
    #[default]
    Follow,
    Random,
}

impl OpponentMode {
    fn parse(arg: &str) -> Option<Self> {
        match arg {
            "follow" => Some(Self::Follow),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

/// Uniform random actions from a seeded stream
struct RandomPolicy {
    rng: Pcg32,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, _observation: &Observation) -> i64 {
        self.rng.random_range(0..PolicyAction::COUNT as i64)
    }
}

/// What happened over the whole run
#[derive(Debug, Default, Serialize)]
struct Summary {
    opponent: OpponentMode,
    ticks: u64,
    seconds: f32,
    winner: Option<Side>,
    levels_completed: u32,
    items_collected: usize,
    wall_bounces: usize,
    finish_denials: usize,
    vehicle_contacts: usize,
    primary_distance: f32,
    opponent_distance: f32,
    hud: Option<Hud>,
}

impl Summary {
    fn record(&mut self, event: &RaceEvent) {
        match event {
            RaceEvent::ItemCollected { .. } => self.items_collected += 1,
            RaceEvent::Bounced {
                cause: BounceCause::Wall,
                ..
            } => self.wall_bounces += 1,
            RaceEvent::Bounced {
                cause: BounceCause::FinishDenied,
                ..
            } => self.finish_denials += 1,
            RaceEvent::VehicleContact => self.vehicle_contacts += 1,
            RaceEvent::LevelCompleted { .. } => self.levels_completed += 1,
            RaceEvent::RaceWon { winner } => self.winner = Some(*winner),
            RaceEvent::ItemShortage {
                kind,
                produced,
                requested,
            } => log::warn!("Track only fits {produced}/{requested} {kind:?} items"),
            RaceEvent::LevelStarted { .. } | RaceEvent::RaceReset => {}
        }
    }
}

/// Defaults scaled down to one lap of the procedural loop
fn demo_config() -> RaceConfig {
    RaceConfig {
        min_finish_distance: 1500.0,
        min_finish_time: 5.0,
        ..Default::default()
    }
}

fn run(
    config_path: Option<String>,
    max_ticks: u64,
    opponent: OpponentMode,
) -> Result<Summary, ConfigError> {
    let mut config = match config_path {
        Some(path) => RaceConfig::load(path)?,
        None => demo_config(),
    };
    // Nobody is there to press start
    config.auto_start = true;

    let layout = LoopLayout::default();
    let track = layout.build()?;
    let pivot = Vec2::new(config.car_size.0 as f32, config.car_size.1 as f32) / 2.0;
    let waypoints = layout.centerline_waypoints(pivot);
    let radius = config.waypoint_arrival_radius;
    let seed = config.seed;

    let mut state = RaceState::new(
        config,
        track,
        Box::new(PathFollower::new(waypoints.clone(), radius)),
        Box::new(PathFollower::new(waypoints, radius)),
    )?;
    if opponent == OpponentMode::Random {
        log::info!("Opponent handed to a random policy (seed {seed})");
        state.set_controller(
            Side::Opponent,
            Box::new(PolicyController::new(RandomPolicy::new(seed))),
        );
    }

    let mut summary = Summary {
        opponent,
        ..Default::default()
    };
    let input = TickInput::default();
    while state.time_ticks() < max_ticks {
        for event in tick(&mut state, &input) {
            summary.record(&event);
        }
        if matches!(state.phase(), RacePhase::Finished { .. }) {
            break;
        }
    }

    if summary.winner.is_none() {
        log::warn!("No winner after {max_ticks} ticks");
    }
    summary.ticks = state.time_ticks();
    summary.seconds = state.now();
    summary.primary_distance = state.vehicle(Side::Primary).total_distance();
    summary.opponent_distance = state.vehicle(Side::Opponent).total_distance();
    summary.hud = Some(state.hud());
    Ok(summary)
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Mask Racer (attract mode) starting...");

    let mut args = std::env::args().skip(1);
    let config_path = args.next();
    let max_ticks = match args.next().map(|arg| arg.parse::<u64>()) {
        Some(Ok(ticks)) => ticks,
        Some(Err(e)) => {
            log::warn!("Ignoring bad max_ticks ({e}), using {DEFAULT_MAX_TICKS}");
            DEFAULT_MAX_TICKS
        }
        None => DEFAULT_MAX_TICKS,
    };
    let opponent = match args.next() {
        Some(arg) => OpponentMode::parse(&arg).unwrap_or_else(|| {
            log::warn!("Unknown opponent '{arg}', following the track instead");
            OpponentMode::default()
        }),
        None => OpponentMode::default(),
    };

    let summary = match run(config_path, max_ticks, opponent) {
        Ok(summary) => summary,
        Err(e) => {
            log::error!("Could not set up race: {e}");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Could not encode summary: {e}");
            ExitCode::FAILURE
        }
    }
}
