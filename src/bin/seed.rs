//! Loads a small demo catalog so the cart endpoints have something to hold.

use rust_decimal::Decimal;
use session_cart::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(config.require_database_url()?).await?;
    run_migrations(&pool).await?;

    let sizes = seed_sizes(&pool, &["S", "M", "L"]).await?;
    seed_products(&pool, &sizes).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_sizes(pool: &DbPool, names: &[&str]) -> anyhow::Result<Vec<(String, Uuid)>> {
    let mut sizes = Vec::with_capacity(names.len());
    for name in names {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO sizes (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(*name)
        .fetch_one(pool)
        .await?;
        sizes.push((name.to_string(), id));
    }
    println!("Seeded sizes");
    Ok(sizes)
}

async fn seed_products(pool: &DbPool, sizes: &[(String, Uuid)]) -> anyhow::Result<()> {
    // (name, base price, price override for size "L")
    let products = [
        ("Linen Shirt", Some(Decimal::new(3900, 2)), Some(Decimal::new(4400, 2))),
        ("Wool Beanie", Some(Decimal::new(1500, 2)), None),
        ("Gift Card", None, None),
    ];

    for (name, price, large_price) in products {
        let (product_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO products (id, name, price)
            VALUES ($1, $2, $3)
            ON CONFLICT (name) DO UPDATE SET price = EXCLUDED.price
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(price)
        .fetch_one(pool)
        .await?;

        let existing: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM product_sizes WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(pool)
                .await?;
        if existing.0 > 0 {
            continue;
        }

        for (size_name, size_id) in sizes {
            let size_price = if size_name == "L" { large_price } else { None };
            let product_size_id = Uuid::new_v4();
            sqlx::query(
                r#"
                INSERT INTO product_sizes (id, product_id, size_id, price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(product_size_id)
            .bind(product_id)
            .bind(size_id)
            .bind(size_price)
            .execute(pool)
            .await?;
            println!("{name} / {size_name}: product {product_id}, size {product_size_id}");
        }
    }

    println!("Seeded products");
    Ok(())
}
