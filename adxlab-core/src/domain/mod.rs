//! Domain types for the ADX pyramid engine.

pub mod ids;
pub mod intent;
pub mod position;
pub mod reading;

pub use ids::{ConfigHash, PositionId};
pub use intent::{ClosePositionIntent, Intent, MarketOrderIntent};
pub use position::{PositionFilter, PositionSnapshot, TrackedPosition, TradeSide};
pub use reading::{IndicatorReading, PriceReading};

/// Symbol type alias
pub type Symbol = String;
