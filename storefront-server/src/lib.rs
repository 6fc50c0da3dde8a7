//! Storefront Server - 电商库存预留与结算后端
//!
//! # 架构概述
//!
//! 本模块是 Storefront Server 的主入口，提供以下核心功能：
//!
//! - **商品目录** (`db`): 嵌入式 SurrealDB 存储商品、购物车、购买记录
//! - **库存账本** (`stock`): redb 原子计数器，先扣减后检查的预留协议
//! - **购物车** (`cart`): 意向清单，不预留库存
//! - **结算** (`checkout`): 逐行 查找 → 预留 → 落账 流水线
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! storefront-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── cart/          # 购物车服务
//! ├── checkout/      # 结算服务
//! ├── stock/         # 库存计数器和预留账本
//! ├── db/            # 数据库层
//! ├── seed/          # 示例目录和库存初始化
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod core;
pub mod db;
pub mod seed;
pub mod stock;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use cart::CartService;
pub use checkout::CheckoutService;
pub use core::{Config, Server, ServerState};
pub use stock::{ReserveOutcome, StockLedger};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置进程环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env 不存在时静默忽略
    let _ = dotenv::dotenv();
    init_logger();
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}
