//! Execution gateway: the seam between the engine and whatever places orders.
//!
//! The engine issues an intent and learns its outcome from the return value.
//! A rejected order is not retried; the engine simply leaves its state as it was.

pub mod paper;

pub use paper::{PaperConfig, PaperGateway};

use thiserror::Error;

use crate::domain::{MarketOrderIntent, PositionId, PositionSnapshot};

/// Errors reported by an execution gateway.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("position {0} not found")]
    PositionNotFound(PositionId),

    #[error("no market price available")]
    NoPrice,
}

/// Places market orders and closes positions on the engine's behalf.
pub trait ExecutionGateway {
    /// Execute a market order; on success, return the newly opened position.
    fn execute_market_order(
        &mut self,
        order: &MarketOrderIntent,
    ) -> Result<PositionSnapshot, ExecutionError>;

    /// Close an open position at market.
    fn close_position(&mut self, id: PositionId) -> Result<(), ExecutionError>;
}
