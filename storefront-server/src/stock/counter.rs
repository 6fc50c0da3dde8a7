//! Atomic counter stores
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `stock_counters` | counter key | `i64` | Live stock per product |
//!
//! # Durability
//!
//! redb commits are persistent as soon as `commit()` returns (copy-on-write
//! with atomic pointer swap), so a reservation that has been acknowledged
//! survives process crashes.

use dashmap::DashMap;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Counter table: key = "stock:<product_id>", value = remaining units
const COUNTERS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("stock_counters");

/// Counter store errors
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
}

pub type CounterResult<T> = Result<T, CounterError>;

/// Atomic signed counters keyed by string
///
/// 语义对齐常见计数器服务：key 不存在时视为 0，decrement 可以把值
/// 减到负数（由调用方检测并回补）。每个方法对单个 key 是线性化的。
pub trait CounterStore: Send + Sync {
    /// Subtract `amount` and return the new value
    fn decrement_by(&self, key: &str, amount: i64) -> CounterResult<i64>;

    /// Add `amount` and return the new value
    fn increment_by(&self, key: &str, amount: i64) -> CounterResult<i64>;

    /// Current value, `None` when the key was never written
    fn get(&self, key: &str) -> CounterResult<Option<i64>>;

    /// Overwrite the value unconditionally
    fn set(&self, key: &str, value: i64) -> CounterResult<()>;

    /// Initialize the value only when the key does not exist yet
    ///
    /// Returns `true` when the value was written.
    fn set_if_absent(&self, key: &str, value: i64) -> CounterResult<bool>;
}

/// Persistent counter store backed by redb
///
/// 每次调整在单个写事务内完成 read-modify-write，redb 写事务串行化，
/// 因此调整是原子的。
#[derive(Clone)]
pub struct RedbCounterStore {
    db: Arc<Database>,
}

impl RedbCounterStore {
    /// Open or create the counter database at the given path
    pub fn open(path: impl AsRef<Path>) -> CounterResult<Self> {
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory counter database (for testing)
    pub fn open_in_memory() -> CounterResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    fn adjust(&self, key: &str, delta: i64) -> CounterResult<i64> {
        let write_txn = self.db.begin_write()?;
        let new_value;
        {
            let mut table = write_txn.open_table(COUNTERS_TABLE)?;
            let current = table.get(key)?.map(|guard| guard.value()).unwrap_or(0);
            new_value = current + delta;
            table.insert(key, new_value)?;
        }
        write_txn.commit()?;
        Ok(new_value)
    }
}

impl CounterStore for RedbCounterStore {
    fn decrement_by(&self, key: &str, amount: i64) -> CounterResult<i64> {
        self.adjust(key, -amount)
    }

    fn increment_by(&self, key: &str, amount: i64) -> CounterResult<i64> {
        self.adjust(key, amount)
    }

    fn get(&self, key: &str) -> CounterResult<Option<i64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value()))
    }

    fn set(&self, key: &str, value: i64) -> CounterResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(COUNTERS_TABLE)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: i64) -> CounterResult<bool> {
        let write_txn = self.db.begin_write()?;
        let written;
        {
            let mut table = write_txn.open_table(COUNTERS_TABLE)?;
            if table.get(key)?.is_none() {
                table.insert(key, value)?;
                written = true;
            } else {
                written = false;
            }
        }
        write_txn.commit()?;
        Ok(written)
    }
}

/// In-memory counter store
///
/// DashMap 的 entry API 保证单 key 的调整是原子的。
#[derive(Default)]
pub struct MemoryCounterStore {
    map: DashMap<String, i64>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn adjust(&self, key: &str, delta: i64) -> i64 {
        let mut entry = self.map.entry(key.to_string()).or_insert(0);
        *entry += delta;
        *entry
    }
}

impl CounterStore for MemoryCounterStore {
    fn decrement_by(&self, key: &str, amount: i64) -> CounterResult<i64> {
        Ok(self.adjust(key, -amount))
    }

    fn increment_by(&self, key: &str, amount: i64) -> CounterResult<i64> {
        Ok(self.adjust(key, amount))
    }

    fn get(&self, key: &str) -> CounterResult<Option<i64>> {
        Ok(self.map.get(key).map(|v| *v))
    }

    fn set(&self, key: &str, value: i64) -> CounterResult<()> {
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn set_if_absent(&self, key: &str, value: i64) -> CounterResult<bool> {
        match self.map.entry(key.to_string()) {
            dashmap::Entry::Occupied(_) => Ok(false),
            dashmap::Entry::Vacant(v) => {
                v.insert(value);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redb_counter_decrements_below_zero() {
        let store = RedbCounterStore::open_in_memory().unwrap();
        store.set("stock:p1", 2).unwrap();
        assert_eq!(store.decrement_by("stock:p1", 5).unwrap(), -3);
        assert_eq!(store.increment_by("stock:p1", 5).unwrap(), 2);
    }

    #[test]
    fn redb_counter_missing_key_decrements_from_zero() {
        let store = RedbCounterStore::open_in_memory().unwrap();
        assert_eq!(store.get("stock:absent").unwrap(), None);
        assert_eq!(store.decrement_by("stock:absent", 1).unwrap(), -1);
    }

    #[test]
    fn redb_set_if_absent_does_not_overwrite() {
        let store = RedbCounterStore::open_in_memory().unwrap();
        assert!(store.set_if_absent("stock:p1", 10).unwrap());
        assert!(!store.set_if_absent("stock:p1", 99).unwrap());
        assert_eq!(store.get("stock:p1").unwrap(), Some(10));
    }

    #[test]
    fn redb_counter_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.redb");

        {
            let store = RedbCounterStore::open(&path).unwrap();
            store.set("stock:p1", 7).unwrap();
        }

        let store = RedbCounterStore::open(&path).unwrap();
        assert_eq!(store.get("stock:p1").unwrap(), Some(7));
    }

    #[test]
    fn memory_counter_matches_redb_semantics() {
        let store = MemoryCounterStore::new();
        assert_eq!(store.get("stock:p1").unwrap(), None);
        assert_eq!(store.decrement_by("stock:p1", 3).unwrap(), -3);
        assert_eq!(store.increment_by("stock:p1", 3).unwrap(), 0);
        // p1 now exists with value 0, so initialization must not touch it
        assert!(!store.set_if_absent("stock:p1", 9).unwrap());
        assert!(store.set_if_absent("stock:p2", 5).unwrap());
        assert_eq!(store.get("stock:p2").unwrap(), Some(5));
    }
}
