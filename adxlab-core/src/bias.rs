//! Bias state: the last committed direction, used to block repeat entries.

use serde::{Deserialize, Serialize};

use crate::domain::TradeSide;

/// Last committed directional stance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    #[default]
    None,
    Bullish,
    Bearish,
}

impl Bias {
    /// The bias a filled entry on `side` commits.
    pub fn for_side(side: TradeSide) -> Self {
        match side {
            TradeSide::Buy => Bias::Bullish,
            TradeSide::Sell => Bias::Bearish,
        }
    }

    /// An entry on `side` is allowed unless the bias already points that way.
    pub fn permits(self, side: TradeSide) -> bool {
        self != Bias::for_side(side)
    }

    /// Record a filled entry. Closing a position never touches the bias.
    pub fn commit(&mut self, side: TradeSide) {
        *self = Bias::for_side(side);
    }
}
