//! Fixed timestep simulation tick
//!
//! One call advances the race by one step. Within a racing tick the order
//! is fixed: expire effects, drive both cars, pick up items, then resolve
//! contacts for the primary car and then the opponent.

use serde::{Deserialize, Serialize};

use super::collision::{Outcome, collect_items, resolve};
use super::controller::KeyState;
use super::progress::{LevelOutcome, RacePhase, Side};
use super::state::{BounceCause, RaceEvent, RaceState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Held driving keys, read by human controllers
    pub keys: KeyState,
    /// Begin the waiting level
    pub start: bool,
    /// Dismiss the result screen after a win
    pub acknowledge: bool,
}

/// Advance the race by one fixed timestep and report what happened
pub fn tick(state: &mut RaceState, input: &TickInput) -> Vec<RaceEvent> {
    let mut events = std::mem::take(&mut state.pending_events);

    match state.progress.phase() {
        // Frozen on the result until acknowledged
        RacePhase::Finished { .. } => {
            if input.acknowledge {
                events.extend(state.reset_race());
            }
            return events;
        }
        RacePhase::Waiting => {
            if !(input.start || state.config.auto_start) {
                return events;
            }
            let now = state.now();
            if state.progress.start_level(now) {
                events.push(RaceEvent::LevelStarted {
                    level: state.progress.level(),
                });
            }
        }
        RacePhase::Racing => {}
    }

    state.time_ticks += 1;
    let now = state.now();

    for vehicle in &mut state.vehicles {
        vehicle.clear_expired_effects(now);
    }

    for side in Side::BOTH {
        let i = side.index();
        let intent = state.controllers[i].intent(&state.vehicles[i], &input.keys);
        state.vehicles[i].apply_intent(intent);
    }

    for side in Side::BOTH {
        let pickups = collect_items(
            &mut state.vehicles[side.index()],
            &mut state.items,
            &state.item_masks,
            &mut state.spawner,
            &state.track,
            now,
        );
        for pickup in pickups {
            events.push(RaceEvent::ItemCollected {
                side,
                kind: pickup.kind,
            });
            if let Some((produced, requested)) = pickup.shortage {
                events.push(RaceEvent::ItemShortage {
                    kind: pickup.kind,
                    produced,
                    requested,
                });
            }
        }
    }

    for side in Side::BOTH {
        // A finish earlier this tick already sent both cars home
        if state.progress.phase() != RacePhase::Racing {
            break;
        }

        let [primary, opponent] = &mut state.vehicles;
        let (vehicle, other) = match side {
            Side::Primary => (primary, opponent),
            Side::Opponent => (opponent, primary),
        };
        let resolution = resolve(
            vehicle,
            side,
            Some(other),
            &state.track,
            &mut state.progress,
            now,
        );

        match resolution.outcome {
            Outcome::None => {}
            Outcome::WallBounce => events.push(RaceEvent::Bounced {
                side,
                cause: BounceCause::Wall,
            }),
            Outcome::FinishDenied => events.push(RaceEvent::Bounced {
                side,
                cause: BounceCause::FinishDenied,
            }),
            Outcome::Finished(LevelOutcome::Advanced { completed, next }) => {
                events.push(RaceEvent::LevelCompleted {
                    side,
                    completed,
                    next,
                });
                state.reset_controllers();
                events.extend(state.respawn_items());
            }
            Outcome::Finished(LevelOutcome::Won { winner }) => {
                events.push(RaceEvent::RaceWon { winner });
                state.reset_controllers();
            }
        }
        if resolution.vehicle_contact {
            events.push(RaceEvent::VehicleContact);
        }
    }

    events
}
