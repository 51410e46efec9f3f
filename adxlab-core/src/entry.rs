//! Entry controller: opens a position when every filter agrees.
//!
//! Evaluated once per completed bar. Buy and sell are checked independently,
//! buy first. Bias and the tracked set change only after the gateway reports a
//! fill; a rejected order leaves both untouched so the next bar can retry.

use tracing::{info, warn};

use crate::bias::Bias;
use crate::config::EngineConfig;
use crate::domain::{Intent, MarketOrderIntent, TrackedPosition, TradeSide};
use crate::engine::state::{EngineEvent, EngineState, StepOutcome};
use crate::engine::BarContext;
use crate::gateway::ExecutionGateway;
use crate::signal::SignalEvaluation;

/// Pure entry rule for one side.
pub fn should_enter(
    side: TradeSide,
    signals: &SignalEvaluation,
    open_count: usize,
    max_positions: usize,
    target_hit: bool,
    bias: Bias,
) -> bool {
    signals.confirms(side) && open_count < max_positions && !target_hit && bias.permits(side)
}

/// Market order for a fresh entry: configured size, stops and the bot label.
pub fn entry_order(config: &EngineConfig, side: TradeSide) -> MarketOrderIntent {
    MarketOrderIntent {
        side,
        symbol: config.symbol.clone(),
        volume: config.volume,
        label: config.label.clone(),
        stop_loss_pips: Some(config.stop_loss_pips),
        take_profit_pips: Some(config.take_profit_pips),
    }
}

/// Bar-close step: entries inside the session, re-arm outside it.
pub fn run_entry_controller<G: ExecutionGateway + ?Sized>(
    config: &EngineConfig,
    state: &mut EngineState,
    ctx: &BarContext<'_>,
    gateway: &mut G,
    outcome: &mut StepOutcome,
) {
    if !config.session.contains(ctx.now) {
        if config.rearm.is_due(ctx.now) && state.risk.rearm() {
            info!(now = %ctx.now, "risk latch re-armed");
            outcome.events.push(EngineEvent::Rearmed);
        }
        return;
    }

    let signals = SignalEvaluation::evaluate(
        ctx.indicator.as_ref(),
        ctx.price.as_ref(),
        config.adx_threshold,
    );
    // Every open position counts, whatever its label.
    enter_on_signals(config, state, &signals, ctx.open_positions.len(), gateway, outcome);
}

/// Check buy then sell against `signals`, sending an order for each side that
/// passes. A fill counts toward `open_count` before the next side is checked.
pub fn enter_on_signals<G: ExecutionGateway + ?Sized>(
    config: &EngineConfig,
    state: &mut EngineState,
    signals: &SignalEvaluation,
    mut open_count: usize,
    gateway: &mut G,
    outcome: &mut StepOutcome,
) {
    for side in [TradeSide::Buy, TradeSide::Sell] {
        if !should_enter(
            side,
            signals,
            open_count,
            config.max_positions,
            state.risk.target_hit,
            state.bias,
        ) {
            continue;
        }

        let order = entry_order(config, side);
        outcome.intents.push(Intent::Entry(order.clone()));
        match gateway.execute_market_order(&order) {
            Ok(filled) => {
                state.bias.commit(side);
                state.tracked.push(TrackedPosition::from_snapshot(&filled));
                open_count += 1;
                info!(%side, position = %filled.id, volume = filled.volume, "entered");
                outcome.events.push(EngineEvent::Entered {
                    side,
                    position_id: filled.id,
                    volume: filled.volume,
                });
            }
            Err(e) => {
                warn!(%side, error = %e, "entry rejected");
                outcome.events.push(EngineEvent::EntryRejected {
                    side,
                    reason: e.to_string(),
                });
            }
        }
    }
}
