//! Strategy configuration: TOML surface, validation, and the validated engine config.
//!
//! `StrategyConfig` mirrors the file on disk. `EngineConfig` is what the engine
//! runs on; the only way to get one is `StrategyConfig::validate()`, so an engine
//! never starts evaluating ticks with a bad configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::{ConfigHash, Symbol};
use crate::session::{DailyRearm, SessionWindow};

/// Allowed range for stop-loss / take-profit distances, in pips.
pub const PIPS_DISTANCE_RANGE: (f64, f64) = (1.0, 1000.0);

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{field}: invalid time '{value}' (expected HH:MM)")]
    InvalidTime { field: &'static str, value: String },

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

/// Price series the reference moving average is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Open,
    High,
    Low,
    Close,
    Median,
    Typical,
    Weighted,
}

/// Indicator parameters. The engine only uses `adx_threshold`; periods and the
/// EMA source are handed to whatever computes the readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub adx_period: u32,
    pub adx_threshold: f64,
    pub ema_period: u32,
    pub ema_source: PriceSource,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            adx_period: 14,
            adx_threshold: 25.0,
            ema_period: 50,
            ema_source: PriceSource::Close,
        }
    }
}

/// Trading window and re-arm boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// "HH:MM"
    pub start: String,
    /// "HH:MM"
    pub end: String,
    /// Outside the window, a tripped risk latch clears while the hour is below this.
    pub rearm_before_hour: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            start: "13:30".into(),
            end: "15:30".into(),
            rearm_before_hour: 1,
        }
    }
}

/// Pyramiding and the aggregate profit/loss thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidConfig {
    pub enabled: bool,
    pub step_pips: f64,
    pub multiplier: f64,
    pub profit_target: f64,
    pub loss_limit: f64,
}

impl Default for PyramidConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            step_pips: 10.0,
            multiplier: 1.0,
            profit_target: 100.0,
            loss_limit: 100.0,
        }
    }
}

/// On-disk strategy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub symbol: Symbol,
    pub label: String,
    /// Entry size in lots.
    pub volume: f64,
    /// Scale-ins must stay strictly below this many lots.
    pub max_volume: f64,
    pub stop_loss_pips: f64,
    pub take_profit_pips: f64,
    pub max_positions: usize,
    pub indicators: IndicatorConfig,
    pub session: SessionConfig,
    pub pyramid: PyramidConfig,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            symbol: "EURUSD".into(),
            label: "ADXAlgo".into(),
            volume: 0.1,
            max_volume: 100.0,
            stop_loss_pips: 10.0,
            take_profit_pips: 10.0,
            max_positions: 1,
            indicators: IndicatorConfig::default(),
            session: SessionConfig::default(),
            pyramid: PyramidConfig::default(),
        }
    }
}

impl StrategyConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string. Missing keys take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Exact identity of this configuration.
    pub fn fingerprint(&self) -> ConfigHash {
        // Struct fields serialize in declaration order, so the JSON is canonical.
        let json = serde_json::to_string(self).expect("StrategyConfig must serialize");
        ConfigHash::from_bytes(json.as_bytes())
    }

    /// Check every field and build the engine configuration.
    pub fn validate(&self) -> Result<EngineConfig, ConfigError> {
        require_non_empty("symbol", &self.symbol)?;
        require_non_empty("label", &self.label)?;
        require_positive("volume", self.volume)?;
        require_positive("max_volume", self.max_volume)?;
        require_range("stop_loss_pips", self.stop_loss_pips, PIPS_DISTANCE_RANGE)?;
        require_range("take_profit_pips", self.take_profit_pips, PIPS_DISTANCE_RANGE)?;
        require_positive("max_positions", self.max_positions as f64)?;

        require_positive("indicators.adx_period", f64::from(self.indicators.adx_period))?;
        require_positive("indicators.ema_period", f64::from(self.indicators.ema_period))?;
        require_range(
            "indicators.adx_threshold",
            self.indicators.adx_threshold,
            (0.0, 100.0),
        )?;

        let session = SessionWindow::parse(&self.session.start, &self.session.end)?;
        require_range(
            "session.rearm_before_hour",
            f64::from(self.session.rearm_before_hour),
            (0.0, 24.0),
        )?;

        require_positive("pyramid.step_pips", self.pyramid.step_pips)?;
        require_positive("pyramid.multiplier", self.pyramid.multiplier)?;
        require_positive("pyramid.profit_target", self.pyramid.profit_target)?;
        require_positive("pyramid.loss_limit", self.pyramid.loss_limit)?;

        Ok(EngineConfig {
            symbol: self.symbol.clone(),
            label: self.label.clone(),
            volume: self.volume,
            max_volume: self.max_volume,
            stop_loss_pips: self.stop_loss_pips,
            take_profit_pips: self.take_profit_pips,
            max_positions: self.max_positions,
            adx_threshold: self.indicators.adx_threshold,
            session,
            rearm: DailyRearm::new(self.session.rearm_before_hour),
            pyramid: PyramidSettings {
                enabled: self.pyramid.enabled,
                step_pips: self.pyramid.step_pips,
                multiplier: self.pyramid.multiplier,
            },
            risk: RiskLimits {
                profit_target: self.pyramid.profit_target,
                loss_limit: self.pyramid.loss_limit,
            },
        })
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty { field });
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn require_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), ConfigError> {
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

/// Pyramiding parameters used by the pyramid manager.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyramidSettings {
    pub enabled: bool,
    pub step_pips: f64,
    pub multiplier: f64,
}

/// Aggregate profit target and loss limit, in account currency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLimits {
    pub profit_target: f64,
    pub loss_limit: f64,
}

/// Validated, read-only configuration the engine runs on.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub symbol: Symbol,
    pub label: String,
    pub volume: f64,
    pub max_volume: f64,
    pub stop_loss_pips: f64,
    pub take_profit_pips: f64,
    pub max_positions: usize,
    pub adx_threshold: f64,
    pub session: SessionWindow,
    pub rearm: DailyRearm,
    pub pyramid: PyramidSettings,
    pub risk: RiskLimits,
}
