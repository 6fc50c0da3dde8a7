//! Stock ledger — reservation and release on top of a counter store
//!
//! # 预留协议
//!
//! | 步骤 | 操作 | 失败处理 |
//! |------|------|----------|
//! | 1 | `decrement_by(stock:<id>, qty)` | 存储错误直接上抛 |
//! | 2 | 结果 >= 0 → 预留成功 | - |
//! | 3 | 结果 < 0 → `increment_by` 回补 | 回补失败是致命错误，单独上报 |
//!
//! 回补失败意味着计数器被永久低估（卖不出去但实际有货），
//! 只能靠人工对账修复，所以它有独立的错误变体而不是普通存储错误。

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

use super::counter::{CounterError, CounterStore};

/// Counter key for a product's live stock
pub fn stock_key(product_id: &str) -> String {
    format!("stock:{product_id}")
}

/// Stock ledger errors
#[derive(Debug, Error)]
pub enum StockError {
    #[error("Quantity must be greater than 0")]
    InvalidQuantity,

    /// 预留中止后回补失败，计数器已偏低
    #[error("Failed to restore {quantity} units of product {product_id} after aborted reservation")]
    CompensationFailed { product_id: String, quantity: u32 },

    #[error("Counter store error: {0}")]
    Store(String),
}

impl From<CounterError> for StockError {
    fn from(e: CounterError) -> Self {
        StockError::Store(e.to_string())
    }
}

pub type StockResult<T> = Result<T, StockError>;

/// Outcome of a reservation attempt
///
/// 库存不足是正常业务结果而非错误：购物车结算要对它逐项累积，
/// 不能让它中断整个循环。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Units are held; `remaining` is the counter after the decrement
    Reserved { remaining: i64 },
    /// Lost the race; `available` is the stock observed after compensation
    Insufficient { available: i64 },
}

/// Reservation / release logic over an atomic counter store
#[derive(Clone)]
pub struct StockLedger {
    counters: Arc<dyn CounterStore>,
}

impl StockLedger {
    pub fn new(counters: Arc<dyn CounterStore>) -> Self {
        Self { counters }
    }

    /// Attempt to reserve `quantity` units of a product
    pub fn reserve(&self, product_id: &str, quantity: u32) -> StockResult<ReserveOutcome> {
        if quantity == 0 {
            return Err(StockError::InvalidQuantity);
        }

        let key = stock_key(product_id);
        let after = self.counters.decrement_by(&key, quantity as i64)?;

        if after >= 0 {
            return Ok(ReserveOutcome::Reserved { remaining: after });
        }

        // Oversold: undo our own decrement and report what is actually left
        let available = match self.counters.increment_by(&key, quantity as i64) {
            Ok(value) => value,
            Err(e) => {
                error!(
                    product_id = %product_id,
                    quantity = quantity,
                    error = %e,
                    "Stock compensation failed, counter is now understated"
                );
                return Err(StockError::CompensationFailed {
                    product_id: product_id.to_string(),
                    quantity,
                });
            }
        };

        warn!(
            product_id = %product_id,
            requested = quantity,
            available = available,
            "Reservation rejected, insufficient stock"
        );

        Ok(ReserveOutcome::Insufficient {
            available: available.max(0),
        })
    }

    /// Return previously reserved units (settlement failed downstream)
    pub fn release(&self, product_id: &str, quantity: u32) -> StockResult<i64> {
        if quantity == 0 {
            return Err(StockError::InvalidQuantity);
        }
        Ok(self
            .counters
            .increment_by(&stock_key(product_id), quantity as i64)?)
    }

    /// Current stock for a product, `None` when the counter was never seeded
    ///
    /// 读路径区分"未播种"和"卖空"：调用方可以用目录上限兜底显示。
    /// 预留路径不兜底，未播种直接当 0 处理。
    pub fn available(&self, product_id: &str) -> StockResult<Option<i64>> {
        Ok(self.counters.get(&stock_key(product_id))?)
    }

    /// Seed the counter for a product, without overwriting an existing value
    ///
    /// Returns `true` when the counter was written.
    pub fn initialize(&self, product_id: &str, stock: i64) -> StockResult<bool> {
        Ok(self.counters.set_if_absent(&stock_key(product_id), stock)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stock::counter::{MemoryCounterStore, RedbCounterStore};

    fn memory_ledger() -> StockLedger {
        StockLedger::new(Arc::new(MemoryCounterStore::new()))
    }

    #[test]
    fn reserve_decrements_counter() {
        let ledger = memory_ledger();
        ledger.initialize("p1", 10).unwrap();

        let outcome = ledger.reserve("p1", 3).unwrap();
        assert_eq!(outcome, ReserveOutcome::Reserved { remaining: 7 });
        assert_eq!(ledger.available("p1").unwrap(), Some(7));
    }

    #[test]
    fn insufficient_reservation_nets_to_zero() {
        let ledger = memory_ledger();
        ledger.initialize("p1", 2).unwrap();

        let outcome = ledger.reserve("p1", 5).unwrap();
        assert_eq!(outcome, ReserveOutcome::Insufficient { available: 2 });
        // Compensation restored the counter exactly
        assert_eq!(ledger.available("p1").unwrap(), Some(2));
    }

    #[test]
    fn unseeded_counter_behaves_as_zero_stock() {
        let ledger = memory_ledger();
        let outcome = ledger.reserve("ghost", 1).unwrap();
        assert_eq!(outcome, ReserveOutcome::Insufficient { available: 0 });
        assert_eq!(ledger.available("ghost").unwrap(), Some(0));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let ledger = memory_ledger();
        ledger.initialize("p1", 10).unwrap();
        assert!(matches!(
            ledger.reserve("p1", 0),
            Err(StockError::InvalidQuantity)
        ));
        assert!(matches!(
            ledger.release("p1", 0),
            Err(StockError::InvalidQuantity)
        ));
    }

    #[test]
    fn release_restores_units() {
        let ledger = memory_ledger();
        ledger.initialize("p1", 5).unwrap();
        ledger.reserve("p1", 5).unwrap();
        assert_eq!(ledger.release("p1", 5).unwrap(), 5);
    }

    #[test]
    fn initialize_does_not_overwrite() {
        let ledger = memory_ledger();
        assert!(ledger.initialize("p1", 10).unwrap());
        ledger.reserve("p1", 4).unwrap();
        assert!(!ledger.initialize("p1", 10).unwrap());
        assert_eq!(ledger.available("p1").unwrap(), Some(6));
    }

    #[test]
    fn concurrent_reserves_never_oversell() {
        let ledger = StockLedger::new(Arc::new(MemoryCounterStore::new()));
        ledger.initialize("hot", 50).unwrap();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let ledger = ledger.clone();
            handles.push(std::thread::spawn(move || {
                let mut won = 0u32;
                for _ in 0..10 {
                    if let ReserveOutcome::Reserved { .. } = ledger.reserve("hot", 1).unwrap() {
                        won += 1;
                    }
                }
                won
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
        assert_eq!(ledger.available("hot").unwrap(), Some(0));
    }

    #[test]
    fn concurrent_reserves_never_oversell_on_redb() {
        let store = Arc::new(RedbCounterStore::open_in_memory().unwrap());
        let ledger = StockLedger::new(store);
        ledger.initialize("hot", 8).unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let ledger = ledger.clone();
            handles.push(std::thread::spawn(move || {
                let mut won = 0u32;
                for _ in 0..5 {
                    if let ReserveOutcome::Reserved { .. } = ledger.reserve("hot", 1).unwrap() {
                        won += 1;
                    }
                }
                won
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 8);
        assert_eq!(ledger.available("hot").unwrap(), Some(0));
    }
}
