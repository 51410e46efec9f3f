//! Replay driver: pushes a recorded tick feed through the engine against the
//! paper gateway.
//!
//! Per tick: mark the gateway, run `on_tick`, and when the tick closes a bar,
//! run `on_bar` with a fresh position snapshot.

use chrono::NaiveDateTime;

use crate::domain::PositionId;
use crate::engine::{BarContext, Engine, StepOutcome, TickContext};
use crate::feed::TickRecord;
use crate::gateway::PaperGateway;

/// What happened on one replayed tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub now: NaiveDateTime,
    /// Positions the gateway closed on its own stop-loss / take-profit.
    pub stopped_out: Vec<PositionId>,
    pub tick: StepOutcome,
    pub bar: Option<StepOutcome>,
}

impl ReplayStep {
    pub fn is_quiet(&self) -> bool {
        self.stopped_out.is_empty()
            && self.tick.is_empty()
            && self.bar.as_ref().map_or(true, StepOutcome::is_empty)
    }

    /// Tick and bar outcomes of this step, in execution order.
    pub fn outcomes(&self) -> impl Iterator<Item = &StepOutcome> {
        std::iter::once(&self.tick).chain(self.bar.iter())
    }
}

/// Replay one tick.
pub fn replay_tick(engine: &mut Engine, gateway: &mut PaperGateway, tick: &TickRecord) -> ReplayStep {
    let stopped_out = gateway.mark(tick.close);

    let positions = gateway.open_positions();
    let tick_outcome = engine.on_tick(
        &TickContext {
            now: tick.now,
            open_positions: &positions,
        },
        gateway,
    );

    let bar_outcome = tick.bar_close.then(|| {
        let positions = gateway.open_positions();
        engine.on_bar(
            &BarContext {
                now: tick.now,
                price: tick.price_reading(),
                indicator: tick.indicator,
                open_positions: &positions,
            },
            gateway,
        )
    });

    ReplayStep {
        now: tick.now,
        stopped_out,
        tick: tick_outcome,
        bar: bar_outcome,
    }
}

/// Replay a whole feed, in order.
pub fn run_replay(
    engine: &mut Engine,
    gateway: &mut PaperGateway,
    ticks: &[TickRecord],
) -> Vec<ReplayStep> {
    ticks
        .iter()
        .map(|tick| replay_tick(engine, gateway, tick))
        .collect()
}
