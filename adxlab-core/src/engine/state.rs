//! Mutable engine state and the per-step outcome record.

use serde::{Deserialize, Serialize};

use crate::bias::Bias;
use crate::domain::{Intent, PositionId, PositionSnapshot, TrackedPosition, TradeSide};
use crate::risk::RiskState;

/// Everything the engine mutates between steps. Owned by a single `Engine`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub bias: Bias,
    pub risk: RiskState,
    /// Positions eligible for scale-ins, in insertion order.
    pub tracked: Vec<TrackedPosition>,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop tracked entries that are no longer open and refresh the rest from
    /// the live snapshot. Returns the pruned ids.
    pub fn sync_tracked(&mut self, open_positions: &[PositionSnapshot]) -> Vec<PositionId> {
        let mut pruned = Vec::new();
        self.tracked.retain_mut(|tracked| {
            match open_positions.iter().find(|p| p.id == tracked.id) {
                Some(live) => {
                    tracked.refresh(live);
                    true
                }
                None => {
                    pruned.push(tracked.id);
                    false
                }
            }
        });
        pruned
    }
}

/// Something the engine did or observed during a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    Entered {
        side: TradeSide,
        position_id: PositionId,
        volume: f64,
    },
    EntryRejected {
        side: TradeSide,
        reason: String,
    },
    ScaledIn {
        replaced: PositionId,
        position_id: PositionId,
        volume: f64,
    },
    ScaleInRejected {
        position_id: PositionId,
        reason: String,
    },
    Closed {
        position_id: PositionId,
    },
    CloseFailed {
        position_id: PositionId,
        reason: String,
    },
    /// "target hit"
    TargetHit {
        total_net_profit: f64,
    },
    /// "loss limit hit"
    LossLimitHit {
        total_net_profit: f64,
    },
    Rearmed,
    Pruned {
        position_id: PositionId,
    },
}

/// Intents issued and events produced by one `on_tick` or `on_bar` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub intents: Vec<Intent>,
    pub events: Vec<EngineEvent>,
}

impl StepOutcome {
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty() && self.events.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter().filter(|i| i.is_entry())
    }

    pub fn scale_ins(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter().filter(|i| i.is_scale_in())
    }

    pub fn closes(&self) -> impl Iterator<Item = &Intent> {
        self.intents.iter().filter(|i| i.is_close())
    }
}
