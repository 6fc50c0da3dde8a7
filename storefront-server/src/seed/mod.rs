//! 示例目录与库存初始化
//!
//! 两个入口：
//! - [`seed_catalog`] - 写入示例商品并初始化对应的库存计数器
//! - [`init_stock`] - 只为已有商品补种库存计数器 (set-if-absent)

use rust_decimal::Decimal;
use tracing::info;

use crate::core::ServerState;
use crate::db::models::ProductCreate;
use crate::db::repository::ProductRepository;
use crate::utils::AppResult;

fn sample_catalog() -> Vec<ProductCreate> {
    fn product(
        name: &str,
        description: &str,
        category: &str,
        price_cents: i64,
        stock_limit: i64,
        image_url: &str,
        tags: &[&str],
    ) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            price: Decimal::new(price_cents, 2),
            stock_limit,
            image_url: image_url.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    vec![
        product(
            "AIR MAX 90 RETRO",
            "Classic sports sneakers with Air Max cushioning. Refreshed retro design.",
            "sneakers",
            12999,
            25,
            "https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=800",
            &["sneakers", "sports", "retro"],
        ),
        product(
            "CHUNKY SNEAKERS PREMIUM",
            "Designer sneakers with a thick sole. Urban, modern look.",
            "sneakers",
            14999,
            30,
            "https://images.unsplash.com/photo-1606107557195-0e29a4b5b4aa?w=800",
            &["sneakers", "urban", "chunky"],
        ),
        product(
            "POLO CLASSIC FIT",
            "Premium cotton polo. Classic, comfortable cut for any occasion.",
            "polos",
            4999,
            50,
            "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=800",
            &["polo", "cotton", "classic"],
        ),
        product(
            "POLO SLIM FIT PREMIUM",
            "Slim-cut polo in high quality fabric. Modern and elegant.",
            "polos",
            5999,
            40,
            "https://images.unsplash.com/photo-1583743814966-8936f5b7be1a?w=800",
            &["polo", "slim", "premium"],
        ),
        product(
            "HOODIE OVERSIZED",
            "Oversized hooded sweatshirt. Comfortable with an urban edge.",
            "sweatshirts",
            7999,
            35,
            "https://images.unsplash.com/photo-1556821840-3a63f95609a7?w=800",
            &["hoodie", "oversized", "urban"],
        ),
        product(
            "CREW NECK SWEATER",
            "Round-neck sweatshirt. Soft, warm fabric for everyday wear.",
            "sweatshirts",
            6999,
            45,
            "https://images.unsplash.com/photo-1576566588028-4147f3842f27?w=800",
            &["sweater", "crew", "basic"],
        ),
        product(
            "BOMBER JACKET",
            "Bomber style jacket with a modern design. Works in every season.",
            "jackets",
            15999,
            20,
            "https://images.unsplash.com/photo-1551028719-00167b16eac5?w=800",
            &["bomber", "jacket", "casual"],
        ),
        product(
            "DENIM JACKET CLASSIC",
            "Classic denim jacket. Timeless and versatile.",
            "jackets",
            8999,
            30,
            "https://images.unsplash.com/photo-1551028719-00167b16eac5?w=800",
            &["denim", "jacket", "classic"],
        ),
        product(
            "JEANS SLIM FIT",
            "Slim-cut jeans. Premium stretch fabric for all-day comfort.",
            "pants",
            8999,
            40,
            "https://images.unsplash.com/photo-1542272604-787c3835535d?w=800",
            &["jeans", "slim", "pants"],
        ),
        product(
            "JEANS RELAXED FIT",
            "Relaxed-cut jeans. Maximum comfort without losing style.",
            "pants",
            7999,
            35,
            "https://images.unsplash.com/photo-1582418702059-97ebafb88868?w=800",
            &["jeans", "relaxed", "comfort"],
        ),
        product(
            "CHRONOGRAPH WATCH",
            "Elegant chronograph watch. Water resistant, automatic movement.",
            "accessories",
            29999,
            15,
            "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=800",
            &["watch", "chronograph", "elegant"],
        ),
        product(
            "SMART WATCH PREMIUM",
            "Feature-packed smart watch. AMOLED display, long battery life.",
            "accessories",
            24999,
            20,
            "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=800",
            &["smartwatch", "tech", "premium"],
        ),
        product(
            "CHAIN NECKLACE GOLD",
            "18k gold chain. Minimal, elegant design with adjustable length.",
            "accessories",
            19999,
            10,
            "https://images.unsplash.com/photo-1515562141207-7a88fb7ce338?w=800",
            &["chain", "gold", "elegant"],
        ),
        product(
            "PENDANT NECKLACE SILVER",
            "Silver pendant necklace. Unique, sophisticated design.",
            "accessories",
            14999,
            18,
            "https://images.unsplash.com/photo-1603561591411-07134e71a2a2?w=800",
            &["necklace", "silver", "pendant"],
        ),
    ]
}

/// 写入示例商品目录并初始化库存计数器
///
/// Returns the number of products created.
pub async fn seed_catalog(state: &ServerState) -> AppResult<usize> {
    let repo = ProductRepository::new(state.get_db());
    let catalog = sample_catalog();
    let count = catalog.len();

    for data in catalog {
        let stock_limit = data.stock_limit;
        let name = data.name.clone();
        let created = repo.create(data).await?;

        state.stock.initialize(&created.key(), stock_limit)?;
        info!(product = %name, stock = stock_limit, id = %created.key(), "Product seeded");
    }

    Ok(count)
}

/// 为所有已有商品补种库存计数器
///
/// 已存在的计数器不会被覆盖，避免抹掉运行期的预留。
/// Returns (seeded, skipped).
pub async fn init_stock(state: &ServerState) -> AppResult<(usize, usize)> {
    let repo = ProductRepository::new(state.get_db());
    let products = repo.find_all_active().await?;

    let mut seeded = 0;
    let mut skipped = 0;
    for product in products {
        let key = product.key();
        if state.stock.initialize(&key, product.stock_limit)? {
            info!(product = %product.name, stock = product.stock_limit, "Stock counter seeded");
            seeded += 1;
        } else {
            info!(product = %product.name, "Stock counter already exists, skipping");
            skipped += 1;
        }
    }

    Ok((seeded, skipped))
}
