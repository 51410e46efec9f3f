//! ADX Lab Core: decision engine for an ADX-rating trend strategy with pyramiding.
//!
//! This crate contains:
//! - Domain types (readings, position snapshots, tracked positions, intents)
//! - Validated TOML configuration
//! - Session clock gate and daily re-arm boundary
//! - Signal evaluator, bias state, entry controller
//! - Pyramid manager and aggregate risk monitor
//! - Execution gateway trait with an in-memory paper implementation
//! - CSV tick feed and a replay driver

pub mod bias;
pub mod config;
pub mod domain;
pub mod engine;
pub mod entry;
pub mod feed;
pub mod gateway;
pub mod pyramid;
pub mod replay;
pub mod risk;
pub mod session;
pub mod signal;

pub use bias::Bias;
pub use config::{ConfigError, EngineConfig, StrategyConfig};
pub use engine::{BarContext, Engine, EngineEvent, EngineState, StepOutcome, TickContext};
pub use gateway::{ExecutionError, ExecutionGateway, PaperConfig, PaperGateway};
pub use risk::RiskState;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine types can move to a worker thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Engine>();
        require_sync::<Engine>();
        require_send::<EngineState>();
        require_sync::<EngineState>();
        require_send::<StepOutcome>();
        require_sync::<StepOutcome>();
        require_send::<PaperGateway>();
        require_sync::<PaperGateway>();
        require_send::<domain::PositionSnapshot>();
        require_sync::<domain::PositionSnapshot>();
        require_send::<domain::Intent>();
        require_sync::<domain::Intent>();
    }

    /// Architecture contract: the signal evaluator sees readings only, never positions.
    #[test]
    fn signal_evaluator_has_no_position_parameter() {
        fn _check(
            indicator: Option<&domain::IndicatorReading>,
            price: Option<&domain::PriceReading>,
        ) -> signal::SignalEvaluation {
            signal::SignalEvaluation::evaluate(indicator, price, 25.0)
        }
    }
}
