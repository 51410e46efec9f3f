//! Trading intents handed to the execution gateway.
//!
//! Intents describe what the engine wants done. Whether it happened is only
//! known from the gateway's reply.

use serde::{Deserialize, Serialize};

use super::ids::PositionId;
use super::position::TradeSide;

/// Open a position (entry) or add to one (scale-in) at market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrderIntent {
    pub side: TradeSide,
    pub symbol: String,
    /// Size in lots.
    pub volume: f64,
    pub label: String,
    pub stop_loss_pips: Option<f64>,
    pub take_profit_pips: Option<f64>,
}

/// Close one open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePositionIntent {
    pub position_id: PositionId,
}

/// Any intent the engine issues in one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    Entry(MarketOrderIntent),
    ScaleIn(MarketOrderIntent),
    Close(ClosePositionIntent),
}

impl Intent {
    pub fn is_entry(&self) -> bool {
        matches!(self, Intent::Entry(_))
    }

    pub fn is_scale_in(&self) -> bool {
        matches!(self, Intent::ScaleIn(_))
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Intent::Close(_))
    }

    /// The market order, for entries and scale-ins.
    pub fn market_order(&self) -> Option<&MarketOrderIntent> {
        match self {
            Intent::Entry(order) | Intent::ScaleIn(order) => Some(order),
            Intent::Close(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> MarketOrderIntent {
        MarketOrderIntent {
            side: TradeSide::Buy,
            symbol: "EURUSD".into(),
            volume: 0.1,
            label: "ADXAlgo".into(),
            stop_loss_pips: Some(10.0),
            take_profit_pips: Some(10.0),
        }
    }

    #[test]
    fn intent_kind_helpers() {
        assert!(Intent::Entry(order()).is_entry());
        assert!(Intent::ScaleIn(order()).is_scale_in());
        let close = Intent::Close(ClosePositionIntent { position_id: PositionId(3) });
        assert!(close.is_close());
        assert!(close.market_order().is_none());
    }

    #[test]
    fn intent_is_tagged_in_json() {
        let json = serde_json::to_value(Intent::Entry(order())).unwrap();
        assert_eq!(json["type"], "entry");
        assert_eq!(json["side"], "buy");
    }
}
