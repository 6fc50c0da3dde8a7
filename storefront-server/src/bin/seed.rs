//! 目录种子工具
//!
//! ```text
//! cargo run --bin seed              # 写入示例商品 + 初始化库存
//! cargo run --bin seed -- --stock-only   # 只补种库存计数器
//! ```

use storefront_server::{Config, ServerState, seed, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_environment().map_err(|e| anyhow::anyhow!("Failed to set up environment: {e}"))?;

    let stock_only = std::env::args().any(|a| a == "--stock-only");

    let config = Config::from_env();
    let state = ServerState::initialize(&config).await;

    if stock_only {
        let (seeded, skipped) = seed::init_stock(&state).await?;
        tracing::info!(seeded, skipped, "Stock counters initialized");
    } else {
        let count = seed::seed_catalog(&state).await?;
        tracing::info!(count, "Sample catalog seeded");
    }

    Ok(())
}
