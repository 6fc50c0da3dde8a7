//! 库存模块 - 预留计数器
//!
//! 实时库存与商品目录分离，存放在独立的原子计数器存储中：
//!
//! - [`CounterStore`] - 计数器存储抽象（原子 decrement/increment）
//! - [`RedbCounterStore`] - redb 持久化实现
//! - [`MemoryCounterStore`] - 内存实现（测试用）
//! - [`StockLedger`] - 预留/释放业务逻辑
//!
//! # 预留协议
//!
//! 先扣减再检查：decrement 后结果为负说明超卖，立即 increment 回补并
//! 报告库存不足。两步之间其他请求观察到的是悲观值（偏小），因此
//! 永远不会把同一件库存卖给两个人。

pub mod counter;
pub mod ledger;

pub use counter::{CounterError, CounterResult, CounterStore, MemoryCounterStore, RedbCounterStore};
pub use ledger::{ReserveOutcome, StockError, StockLedger, StockResult, stock_key};
