//! Per-bar readings supplied by the indicator collaborator.
//!
//! The core never computes indicator values. It only checks that a reading is
//! usable; an unusable reading is treated as "no signal".

use serde::{Deserialize, Serialize};

/// Directional-movement reading for the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    pub di_plus: f64,
    pub di_minus: f64,
    /// ADX rating (ADXR) value.
    pub adx_rating: f64,
}

impl IndicatorReading {
    pub fn new(di_plus: f64, di_minus: f64, adx_rating: f64) -> Self {
        Self { di_plus, di_minus, adx_rating }
    }

    /// Returns true if every component is a finite number.
    pub fn is_usable(&self) -> bool {
        self.di_plus.is_finite() && self.di_minus.is_finite() && self.adx_rating.is_finite()
    }
}

/// Close price plus the moving average of the configured source series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceReading {
    pub close: f64,
    pub reference_ma: f64,
}

impl PriceReading {
    pub fn new(close: f64, reference_ma: f64) -> Self {
        Self { close, reference_ma }
    }

    pub fn is_usable(&self) -> bool {
        self.close.is_finite() && self.reference_ma.is_finite()
    }
}
