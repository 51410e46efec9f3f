//! Engine: owns the configuration and mutable state, and sequences the components.
//!
//! Two entry points, both infallible:
//!
//! 1. `on_tick`: prune tracked positions, then (with pyramiding enabled) risk
//!    monitor and pyramid manager
//! 2. `on_bar`: entry controller (or the daily re-arm outside the session)
//!
//! The caller supplies the clock, the readings and the live open positions; all
//! orders go through the `ExecutionGateway` it passes in.

pub mod state;

pub use state::{EngineEvent, EngineState, StepOutcome};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::config::{ConfigError, EngineConfig, StrategyConfig};
use crate::domain::{IndicatorReading, PositionSnapshot, PriceReading};
use crate::entry::run_entry_controller;
use crate::gateway::ExecutionGateway;
use crate::pyramid::run_pyramid_manager;
use crate::risk::run_risk_monitor;

/// Inputs for one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub now: NaiveDateTime,
    pub open_positions: &'a [PositionSnapshot],
}

/// Inputs for one completed bar. A `None` reading means "no signal".
#[derive(Debug, Clone, Copy)]
pub struct BarContext<'a> {
    pub now: NaiveDateTime,
    pub price: Option<PriceReading>,
    pub indicator: Option<IndicatorReading>,
    pub open_positions: &'a [PositionSnapshot],
}

/// The decision engine for one symbol and label.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    state: EngineState,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: EngineState::new(),
        }
    }

    /// Validate `config` and build an engine from it.
    pub fn from_strategy(config: &StrategyConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.validate()?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Mutable access for callers that restore or inspect state directly.
    pub fn state_mut(&mut self) -> &mut EngineState {
        &mut self.state
    }

    pub fn on_tick<G: ExecutionGateway + ?Sized>(
        &mut self,
        ctx: &TickContext<'_>,
        gateway: &mut G,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        self.prune(ctx.open_positions, &mut outcome);

        // The profit target and loss limit belong to the pyramiding settings.
        if !self.config.pyramid.enabled {
            return outcome;
        }

        let closed = run_risk_monitor(
            &self.config,
            &mut self.state.risk,
            ctx.open_positions,
            gateway,
            &mut outcome,
        );
        if !closed.is_empty() {
            self.state.tracked.retain(|t| !closed.contains(&t.id));
        }

        run_pyramid_manager(&self.config, &mut self.state, ctx.now, gateway, &mut outcome);
        outcome
    }

    pub fn on_bar<G: ExecutionGateway + ?Sized>(
        &mut self,
        ctx: &BarContext<'_>,
        gateway: &mut G,
    ) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        self.prune(ctx.open_positions, &mut outcome);
        run_entry_controller(&self.config, &mut self.state, ctx, gateway, &mut outcome);
        outcome
    }

    fn prune(&mut self, open_positions: &[PositionSnapshot], outcome: &mut StepOutcome) {
        for position_id in self.state.sync_tracked(open_positions) {
            debug!(position = %position_id, "no longer open, untracked");
            outcome.events.push(EngineEvent::Pruned { position_id });
        }
    }
}
