//! Risk monitor: aggregate profit/loss circuit breaker.
//!
//! The aggregate is summed over every open position carrying the bot label,
//! whatever its symbol. Liquidation closes only positions that match both the
//! label and the configured symbol.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::domain::{ClosePositionIntent, Intent, PositionFilter, PositionId, PositionSnapshot};
use crate::engine::state::{EngineEvent, StepOutcome};
use crate::gateway::ExecutionGateway;

/// Latch set when either threshold fires; cleared only at the daily re-arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskState {
    pub target_hit: bool,
}

impl RiskState {
    pub fn trip(&mut self) {
        self.target_hit = true;
    }

    /// Clear the latch. Returns true if it was set.
    pub fn rearm(&mut self) -> bool {
        std::mem::replace(&mut self.target_hit, false)
    }
}

/// Sum of net profit over positions matching `filter`, skipping `excluded` ids.
pub fn total_net_profit(
    open_positions: &[PositionSnapshot],
    filter: &PositionFilter<'_>,
    excluded: &[PositionId],
) -> f64 {
    open_positions
        .iter()
        .filter(|p| filter.matches(p) && !excluded.contains(&p.id))
        .map(|p| p.net_profit)
        .sum()
}

/// Run both threshold checks, profit first. Returns the ids closed successfully.
pub fn run_risk_monitor<G: ExecutionGateway + ?Sized>(
    config: &EngineConfig,
    risk: &mut RiskState,
    open_positions: &[PositionSnapshot],
    gateway: &mut G,
    outcome: &mut StepOutcome,
) -> Vec<PositionId> {
    let sum_filter = PositionFilter::Label(&config.label);
    let close_filter = PositionFilter::LabelAndSymbol {
        label: &config.label,
        symbol: &config.symbol,
    };
    let mut closed = Vec::new();

    let total = total_net_profit(open_positions, &sum_filter, &closed);
    if total >= config.risk.profit_target {
        liquidate(open_positions, &close_filter, gateway, &mut closed, outcome);
        risk.trip();
        info!(total_net_profit = total, target = config.risk.profit_target, "target hit");
        outcome.events.push(EngineEvent::TargetHit { total_net_profit: total });
    }

    // Recomputed: positions closed above no longer count.
    let total = total_net_profit(open_positions, &sum_filter, &closed);
    if total <= -config.risk.loss_limit {
        liquidate(open_positions, &close_filter, gateway, &mut closed, outcome);
        risk.trip();
        info!(total_net_profit = total, limit = config.risk.loss_limit, "loss limit hit");
        outcome.events.push(EngineEvent::LossLimitHit { total_net_profit: total });
    }

    closed
}

fn liquidate<G: ExecutionGateway + ?Sized>(
    open_positions: &[PositionSnapshot],
    filter: &PositionFilter<'_>,
    gateway: &mut G,
    closed: &mut Vec<PositionId>,
    outcome: &mut StepOutcome,
) {
    for position in open_positions.iter().filter(|p| filter.matches(p)) {
        if closed.contains(&position.id) {
            continue;
        }
        outcome.intents.push(Intent::Close(ClosePositionIntent {
            position_id: position.id,
        }));
        match gateway.close_position(position.id) {
            Ok(()) => {
                info!(position = %position.id, net_profit = position.net_profit, "closed");
                closed.push(position.id);
                outcome.events.push(EngineEvent::Closed { position_id: position.id });
            }
            Err(e) => {
                warn!(position = %position.id, error = %e, "close failed");
                outcome.events.push(EngineEvent::CloseFailed {
                    position_id: position.id,
                    reason: e.to_string(),
                });
            }
        }
    }
}
