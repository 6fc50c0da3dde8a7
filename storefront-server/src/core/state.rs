use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::cart::CartService;
use crate::checkout::CheckoutService;
use crate::core::Config;
use crate::db;
use crate::stock::{MemoryCounterStore, RedbCounterStore, StockLedger};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 (目录/购物车/购买记录) |
/// | stock | StockLedger | 库存预留计数器 |
/// | cart | CartService | 购物车服务 |
/// | checkout | CheckoutService | 结算服务 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 库存预留计数器
    pub stock: StockLedger,
    /// 购物车服务
    pub cart: CartService,
    /// 结算服务
    pub checkout: CheckoutService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, db: Surreal<Db>, stock: StockLedger) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let cart = CartService::new(db.clone(), stock.clone());
        let checkout = CheckoutService::new(db.clone(), stock.clone());

        Self {
            config,
            db,
            stock,
            cart,
            checkout,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/)
    /// 3. 库存计数器 (work_dir/stock_counters.redb)
    /// 4. 各服务 (Cart, Checkout, JWT)
    ///
    /// # Panics
    ///
    /// 数据库或计数器初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_dir = config.database_dir();
        let db = db::connect(&db_dir.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let counters =
            RedbCounterStore::open(config.stock_db_path()).expect("Failed to open stock counters");
        let stock = StockLedger::new(Arc::new(counters));

        Self::new(config.clone(), db, stock)
    }

    /// 全内存状态 (集成测试用)
    pub async fn initialize_in_memory(config: &Config) -> Self {
        let db = db::connect_memory()
            .await
            .expect("Failed to initialize in-memory database");
        let stock = StockLedger::new(Arc::new(MemoryCounterStore::new()));
        Self::new(config.clone(), db, stock)
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
