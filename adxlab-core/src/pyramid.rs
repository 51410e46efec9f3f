//! Pyramid manager: scales into tracked positions once they are far enough in profit.
//!
//! Runs every tick while pyramiding is enabled, the session is open and the risk
//! latch is clear. Tracked positions are scanned in insertion order and at most
//! one scale-in is attempted per tick: the first eligible position wins.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::domain::{Intent, MarketOrderIntent, TrackedPosition};
use crate::engine::state::{EngineEvent, EngineState, StepOutcome};
use crate::gateway::ExecutionGateway;

/// Round to one decimal place, ties to even.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// Size of the next scale-in for a position of `volume` lots.
pub fn scale_in_volume(volume: f64, multiplier: f64) -> f64 {
    round_to_tenth(volume * multiplier)
}

/// Outcome of checking one tracked position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScaleInCheck {
    /// Profit has not reached the step yet.
    BelowStep,
    /// The computed size reaches the lot cap; nothing is sent.
    AtCap { volume: f64 },
    /// The computed size rounds to zero.
    TooSmall,
    Eligible { volume: f64 },
}

pub fn check_scale_in(
    tracked: &TrackedPosition,
    step_pips: f64,
    multiplier: f64,
    max_volume: f64,
) -> ScaleInCheck {
    if !(tracked.unrealized_pips >= step_pips) {
        return ScaleInCheck::BelowStep;
    }
    let volume = scale_in_volume(tracked.volume, multiplier);
    if volume >= max_volume {
        ScaleInCheck::AtCap { volume }
    } else if volume <= 0.0 {
        ScaleInCheck::TooSmall
    } else {
        ScaleInCheck::Eligible { volume }
    }
}

/// Same side and label as the tracked position, no stop-loss or take-profit.
pub fn scale_in_order(config: &EngineConfig, tracked: &TrackedPosition, volume: f64) -> MarketOrderIntent {
    MarketOrderIntent {
        side: tracked.side,
        symbol: config.symbol.clone(),
        volume,
        label: tracked.entry_label.clone(),
        stop_loss_pips: None,
        take_profit_pips: None,
    }
}

/// Tick step. Expects `state.tracked` to be synced with the live positions.
pub fn run_pyramid_manager<G: ExecutionGateway + ?Sized>(
    config: &EngineConfig,
    state: &mut EngineState,
    now: chrono::NaiveDateTime,
    gateway: &mut G,
    outcome: &mut StepOutcome,
) {
    let settings = config.pyramid;
    if !settings.enabled || state.risk.target_hit || !config.session.contains(now) {
        return;
    }

    for slot in 0..state.tracked.len() {
        let tracked = &state.tracked[slot];
        let volume = match check_scale_in(tracked, settings.step_pips, settings.multiplier, config.max_volume) {
            ScaleInCheck::Eligible { volume } => volume,
            ScaleInCheck::AtCap { volume } => {
                debug!(position = %tracked.id, volume, max_volume = config.max_volume, "scale-in at lot cap");
                continue;
            }
            ScaleInCheck::TooSmall => {
                debug!(position = %tracked.id, "scale-in rounds to zero");
                continue;
            }
            ScaleInCheck::BelowStep => continue,
        };

        let replaced = tracked.id;
        let order = scale_in_order(config, tracked, volume);
        outcome.intents.push(Intent::ScaleIn(order.clone()));
        match gateway.execute_market_order(&order) {
            Ok(filled) => {
                info!(%replaced, position = %filled.id, volume, "scaled in");
                state.tracked[slot] = TrackedPosition::from_snapshot(&filled);
                outcome.events.push(EngineEvent::ScaledIn {
                    replaced,
                    position_id: filled.id,
                    volume,
                });
            }
            Err(e) => {
                warn!(position = %replaced, error = %e, "scale-in rejected");
                outcome.events.push(EngineEvent::ScaleInRejected {
                    position_id: replaced,
                    reason: e.to_string(),
                });
            }
        }
        // One attempt per tick, filled or not.
        break;
    }
}
