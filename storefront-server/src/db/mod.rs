//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine) connection management.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Namespace / database names for the embedded instance
const DB_NAMESPACE: &str = "storefront";
const DB_DATABASE: &str = "main";

/// Open the embedded database at the given directory
///
/// 数据目录不存在时由 RocksDB 引擎自动创建。
pub async fn connect(db_dir: &str) -> Result<Surreal<Db>, AppError> {
    let db = Surreal::new::<RocksDb>(db_dir)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

    db.use_ns(DB_NAMESPACE)
        .use_db(DB_DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

    tracing::info!(path = %db_dir, "Database connection established (SurrealDB RocksDB)");

    Ok(db)
}

/// In-memory database for tests and ephemeral runs
pub async fn connect_memory() -> Result<Surreal<Db>, AppError> {
    use surrealdb::engine::local::Mem;

    let db = Surreal::new::<Mem>(())
        .await
        .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

    db.use_ns(DB_NAMESPACE)
        .use_db(DB_DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

    Ok(db)
}
