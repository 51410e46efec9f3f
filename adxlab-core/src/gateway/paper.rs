//! In-memory paper gateway: fills at the last marked price, marks positions to
//! market, and enforces stop-loss / take-profit levels on every mark.

use serde::{Deserialize, Serialize};

use crate::domain::{MarketOrderIntent, PositionId, PositionSnapshot, TradeSide};

use super::{ExecutionError, ExecutionGateway};

/// Pricing parameters for the paper gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperConfig {
    /// The only symbol this gateway prices and fills.
    pub symbol: String,
    /// Price distance of one pip (0.0001 for most FX pairs).
    pub pip_size: f64,
    /// Account-currency value of one pip for one lot.
    pub pip_value_per_lot: f64,
}

impl PaperConfig {
    pub fn new(symbol: impl Into<String>, pip_size: f64, pip_value_per_lot: f64) -> Self {
        Self {
            symbol: symbol.into(),
            pip_size,
            pip_value_per_lot,
        }
    }
}

#[derive(Debug, Clone)]
struct PaperPosition {
    snapshot: PositionSnapshot,
    entry_price: f64,
    take_profit_price: Option<f64>,
}

impl PaperPosition {
    fn mark(&mut self, price: f64, config: &PaperConfig) {
        let pips = (price - self.entry_price) * self.snapshot.side.sign() / config.pip_size;
        self.snapshot.pips_profit = pips;
        self.snapshot.net_profit = pips * config.pip_value_per_lot * self.snapshot.volume;
    }

    fn exit_touched(&self, price: f64) -> bool {
        let stop = self.snapshot.stop_loss_price;
        let target = self.take_profit_price;
        match self.snapshot.side {
            TradeSide::Buy => {
                stop.is_some_and(|s| price <= s) || target.is_some_and(|t| price >= t)
            }
            TradeSide::Sell => {
                stop.is_some_and(|s| price >= s) || target.is_some_and(|t| price <= t)
            }
        }
    }
}

/// Simulated execution venue for replays and tests.
#[derive(Debug, Clone)]
pub struct PaperGateway {
    config: PaperConfig,
    positions: Vec<PaperPosition>,
    next_id: u64,
    last_price: Option<f64>,
    reject_next: Option<String>,
}

impl PaperGateway {
    pub fn new(config: PaperConfig) -> Self {
        Self {
            config,
            positions: Vec::new(),
            next_id: 1,
            last_price: None,
            reject_next: None,
        }
    }

    /// Make the next order fail with `reason`.
    pub fn reject_next(&mut self, reason: impl Into<String>) {
        self.reject_next = Some(reason.into());
    }

    /// Update the market price, revalue every position, and close those whose
    /// stop-loss or take-profit was touched. Returns the closed ids.
    pub fn mark(&mut self, price: f64) -> Vec<PositionId> {
        self.last_price = Some(price);
        let config = &self.config;
        let mut closed = Vec::new();
        self.positions.retain_mut(|p| {
            p.mark(price, config);
            if p.exit_touched(price) {
                closed.push(p.snapshot.id);
                false
            } else {
                true
            }
        });
        closed
    }

    /// Live open positions, in the order they were opened.
    pub fn open_positions(&self) -> Vec<PositionSnapshot> {
        self.positions.iter().map(|p| p.snapshot.clone()).collect()
    }

    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    fn allocate_id(&mut self) -> PositionId {
        let id = PositionId(self.next_id);
        self.next_id += 1;
        id
    }

    fn price_offset(&self, side: TradeSide, entry: f64, pips: Option<f64>, sign: f64) -> Option<f64> {
        pips.map(|p| entry + side.sign() * sign * p * self.config.pip_size)
    }
}

impl ExecutionGateway for PaperGateway {
    fn execute_market_order(
        &mut self,
        order: &MarketOrderIntent,
    ) -> Result<PositionSnapshot, ExecutionError> {
        if let Some(reason) = self.reject_next.take() {
            return Err(ExecutionError::Rejected(reason));
        }
        if order.symbol != self.config.symbol {
            return Err(ExecutionError::Rejected(format!(
                "unknown symbol {}",
                order.symbol
            )));
        }
        if !order.volume.is_finite() || order.volume <= 0.0 {
            return Err(ExecutionError::Rejected(format!(
                "invalid volume {}",
                order.volume
            )));
        }
        let price = self.last_price.ok_or(ExecutionError::NoPrice)?;

        let id = self.allocate_id();
        let snapshot = PositionSnapshot {
            id,
            label: order.label.clone(),
            side: order.side,
            volume: order.volume,
            symbol: order.symbol.clone(),
            net_profit: 0.0,
            pips_profit: 0.0,
            stop_loss_price: self.price_offset(order.side, price, order.stop_loss_pips, -1.0),
        };
        let take_profit_price = self.price_offset(order.side, price, order.take_profit_pips, 1.0);
        self.positions.push(PaperPosition {
            snapshot: snapshot.clone(),
            entry_price: price,
            take_profit_price,
        });
        Ok(snapshot)
    }

    fn close_position(&mut self, id: PositionId) -> Result<(), ExecutionError> {
        let index = self
            .positions
            .iter()
            .position(|p| p.snapshot.id == id)
            .ok_or(ExecutionError::PositionNotFound(id))?;
        self.positions.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> PaperGateway {
        let mut gw = PaperGateway::new(PaperConfig::new("EURUSD", 0.0001, 10.0));
        gw.mark(1.1000);
        gw
    }

    fn order(side: TradeSide, volume: f64) -> MarketOrderIntent {
        MarketOrderIntent {
            side,
            symbol: "EURUSD".into(),
            volume,
            label: "ADXAlgo".into(),
            stop_loss_pips: Some(10.0),
            take_profit_pips: Some(20.0),
        }
    }

    #[test]
    fn fill_assigns_sequential_ids_and_stop() {
        let mut gw = gateway();
        let a = gw.execute_market_order(&order(TradeSide::Buy, 0.1)).unwrap();
        let b = gw.execute_market_order(&order(TradeSide::Sell, 0.1)).unwrap();
        assert_eq!(a.id, PositionId(1));
        assert_eq!(b.id, PositionId(2));
        assert!((a.stop_loss_price.unwrap() - 1.0990).abs() < 1e-9);
        assert!((b.stop_loss_price.unwrap() - 1.1010).abs() < 1e-9);
        assert_eq!(gw.open_count(), 2);
    }

    #[test]
    fn mark_updates_pips_and_net_profit() {
        let mut gw = gateway();
        gw.execute_market_order(&order(TradeSide::Buy, 0.5)).unwrap();
        gw.mark(1.1005);
        let pos = &gw.open_positions()[0];
        assert!((pos.pips_profit - 5.0).abs() < 1e-6);
        assert!((pos.net_profit - 25.0).abs() < 1e-6);
    }

    #[test]
    fn sell_profits_when_price_falls() {
        let mut gw = gateway();
        gw.execute_market_order(&order(TradeSide::Sell, 1.0)).unwrap();
        gw.mark(1.0995);
        let pos = &gw.open_positions()[0];
        assert!((pos.pips_profit - 5.0).abs() < 1e-6);
        assert!((pos.net_profit - 50.0).abs() < 1e-6);
    }

    #[test]
    fn stop_loss_closes_position_on_mark() {
        let mut gw = gateway();
        let pos = gw.execute_market_order(&order(TradeSide::Buy, 0.1)).unwrap();
        let closed = gw.mark(1.0989);
        assert_eq!(closed, vec![pos.id]);
        assert_eq!(gw.open_count(), 0);
    }

    #[test]
    fn take_profit_closes_position_on_mark() {
        let mut gw = gateway();
        let pos = gw.execute_market_order(&order(TradeSide::Buy, 0.1)).unwrap();
        assert!(gw.mark(1.1019).is_empty());
        assert_eq!(gw.mark(1.1021), vec![pos.id]);
    }

    #[test]
    fn order_without_stops_is_never_auto_closed() {
        let mut gw = gateway();
        let mut o = order(TradeSide::Buy, 0.1);
        o.stop_loss_pips = None;
        o.take_profit_pips = None;
        gw.execute_market_order(&o).unwrap();
        assert!(gw.mark(1.0).is_empty());
        assert!(gw.mark(1.5).is_empty());
    }

    #[test]
    fn reject_next_fails_once() {
        let mut gw = gateway();
        gw.reject_next("market closed");
        let err = gw.execute_market_order(&order(TradeSide::Buy, 0.1)).unwrap_err();
        assert_eq!(err, ExecutionError::Rejected("market closed".into()));
        assert!(gw.execute_market_order(&order(TradeSide::Buy, 0.1)).is_ok());
    }

    #[test]
    fn no_price_means_no_fill() {
        let mut gw = PaperGateway::new(PaperConfig::new("EURUSD", 0.0001, 10.0));
        let err = gw.execute_market_order(&order(TradeSide::Buy, 0.1)).unwrap_err();
        assert_eq!(err, ExecutionError::NoPrice);
    }

    #[test]
    fn foreign_symbol_and_zero_volume_are_rejected() {
        let mut gw = gateway();
        let mut o = order(TradeSide::Buy, 0.1);
        o.symbol = "GBPUSD".into();
        assert!(matches!(gw.execute_market_order(&o), Err(ExecutionError::Rejected(_))));
        assert!(matches!(
            gw.execute_market_order(&order(TradeSide::Buy, 0.0)),
            Err(ExecutionError::Rejected(_))
        ));
    }

    #[test]
    fn close_unknown_position_is_error() {
        let mut gw = gateway();
        assert_eq!(
            gw.close_position(PositionId(99)),
            Err(ExecutionError::PositionNotFound(PositionId(99)))
        );
    }
}
