//! Open-position views: the live snapshot supplied by the execution side and the
//! pyramid manager's tracked entries.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::PositionId;

/// Direction of a position or market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// +1 for buys, -1 for sells.
    pub fn sign(self) -> f64 {
        match self {
            TradeSide::Buy => 1.0,
            TradeSide::Sell => -1.0,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// One open position as reported by the execution side on each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub id: PositionId,
    pub label: String,
    pub side: TradeSide,
    /// Size in lots.
    pub volume: f64,
    pub symbol: String,
    /// Unrealized profit in account currency, net of costs.
    pub net_profit: f64,
    /// Unrealized profit in pips.
    pub pips_profit: f64,
    pub stop_loss_price: Option<f64>,
}

/// A position the pyramid manager may scale into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPosition {
    pub id: PositionId,
    pub side: TradeSide,
    pub volume: f64,
    pub stop_loss_price: Option<f64>,
    /// Label the position was opened with. Scale-ins reuse it verbatim.
    pub entry_label: String,
    pub unrealized_pips: f64,
}

impl TrackedPosition {
    pub fn from_snapshot(snapshot: &PositionSnapshot) -> Self {
        Self {
            id: snapshot.id,
            side: snapshot.side,
            volume: snapshot.volume,
            stop_loss_price: snapshot.stop_loss_price,
            entry_label: snapshot.label.clone(),
            unrealized_pips: snapshot.pips_profit,
        }
    }

    /// Refresh volume, stop and profit from the live snapshot of the same position.
    pub fn refresh(&mut self, snapshot: &PositionSnapshot) {
        debug_assert_eq!(self.id, snapshot.id);
        self.volume = snapshot.volume;
        self.stop_loss_price = snapshot.stop_loss_price;
        self.unrealized_pips = snapshot.pips_profit;
    }
}

/// Which open positions belong to the bot.
///
/// The aggregate P/L sum matches on label only, while liquidation also
/// requires the symbol to match. Both variants are kept so callers state
/// which one they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionFilter<'a> {
    Label(&'a str),
    LabelAndSymbol { label: &'a str, symbol: &'a str },
}

impl PositionFilter<'_> {
    pub fn matches(&self, position: &PositionSnapshot) -> bool {
        match self {
            PositionFilter::Label(label) => position.label == *label,
            PositionFilter::LabelAndSymbol { label, symbol } => {
                position.label == *label && position.symbol == *symbol
            }
        }
    }
}
