//! Signal evaluator: directional predicates over the latest readings.
//!
//! Stateless: everything is recomputed from the readings on every call. A missing
//! or non-finite reading yields an evaluation with every predicate false.

use serde::{Deserialize, Serialize};

use crate::domain::{IndicatorReading, PriceReading, TradeSide};

/// The six predicates the entry controller combines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvaluation {
    pub bullish_cross: bool,
    pub bearish_cross: bool,
    pub adx_bullish: bool,
    pub adx_bearish: bool,
    pub price_above_ma: bool,
    pub price_below_ma: bool,
}

impl SignalEvaluation {
    /// Evaluate against `adx_threshold`. Equal values satisfy neither side.
    pub fn evaluate(
        indicator: Option<&IndicatorReading>,
        price: Option<&PriceReading>,
        adx_threshold: f64,
    ) -> Self {
        let (Some(ind), Some(px)) = (indicator, price) else {
            return Self::default();
        };
        if !ind.is_usable() || !px.is_usable() {
            return Self::default();
        }

        Self {
            bullish_cross: ind.di_plus > ind.di_minus,
            bearish_cross: ind.di_plus < ind.di_minus,
            adx_bullish: ind.adx_rating > adx_threshold,
            adx_bearish: ind.adx_rating < adx_threshold,
            price_above_ma: px.close > px.reference_ma,
            price_below_ma: px.close < px.reference_ma,
        }
    }

    /// Cross, ADX and EMA filters all agree on `side`.
    pub fn confirms(&self, side: TradeSide) -> bool {
        match side {
            TradeSide::Buy => self.bullish_cross && self.adx_bullish && self.price_above_ma,
            TradeSide::Sell => self.bearish_cross && self.adx_bearish && self.price_below_ma,
        }
    }
}
