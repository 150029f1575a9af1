use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::{Cart, CartItem, CartLine, Product, ProductSize},
    store::{CartStore, Catalog},
};

// Postgres `numeric_value_out_of_range`.
const OUT_OF_RANGE: &str = "22003";
// Postgres `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(FromRow)]
struct CartLineRow {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    product_size_id: Uuid,
    quantity: i32,
    added_at: DateTime<Utc>,
    product_name: String,
    product_price: Option<Decimal>,
    size_name: Option<String>,
    size_price: Option<Decimal>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        CartLine {
            item: CartItem {
                id: row.id,
                cart_id: row.cart_id,
                product_id: row.product_id,
                product_size_id: row.product_size_id,
                quantity: row.quantity,
                added_at: row.added_at,
            },
            product: Product {
                id: row.product_id,
                name: row.product_name,
                price: row.product_price,
            },
            size: ProductSize::new(
                row.product_size_id,
                row.product_id,
                row.size_name,
                row.size_price,
            ),
        }
    }
}

#[derive(FromRow)]
struct ProductSizeRow {
    id: Uuid,
    product_id: Uuid,
    size_name: Option<String>,
    price: Option<Decimal>,
}

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn touch_cart(tx: &mut Transaction<'_, Postgres>, cart_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE carts SET updated_at = now() WHERE id = $1")
            .bind(cart_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

/// Maps the failures an item upsert can hit to the errors `MemoryStore` returns.
fn map_upsert_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some(OUT_OF_RANGE) => {
                return AppError::BadRequest("quantity is too large".to_string());
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return match db_err.constraint() {
                    Some(constraint) if constraint.contains("product_size_id") => {
                        AppError::BadRequest("product size not found".to_string())
                    }
                    Some(constraint) if constraint.contains("product_id") => {
                        AppError::BadRequest("product not found".to_string())
                    }
                    _ => AppError::NotFound,
                };
            }
            _ => {}
        }
    }
    AppError::DbError(err)
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_cart(&self, session_key: &str) -> AppResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, session_key, created_at, updated_at FROM carts WHERE session_key = $1",
        )
        .bind(session_key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(cart)
    }

    async fn get_or_create_cart(&self, session_key: &str) -> AppResult<Cart> {
        // The no-op update lets RETURNING yield the existing row on conflict.
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (id, session_key)
            VALUES ($1, $2)
            ON CONFLICT (session_key) DO UPDATE SET session_key = EXCLUDED.session_key
            RETURNING id, session_key, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_key)
        .fetch_one(&self.pool)
        .await?;
        Ok(cart)
    }

    async fn delete_cart(&self, cart_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_lines(&self, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT ci.id, ci.cart_id, ci.product_id, ci.product_size_id, ci.quantity, ci.added_at,
                   p.name AS product_name, p.price AS product_price,
                   s.name AS size_name, ps.price AS size_price
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            JOIN product_sizes ps ON ps.id = ci.product_size_id
            LEFT JOIN sizes s ON s.id = ps.size_id
            WHERE ci.cart_id = $1
            ORDER BY ci.seq
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    async fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        product_size_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, product_size_id, quantity)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (cart_id, product_id, product_size_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            RETURNING id, cart_id, product_id, product_size_id, quantity, added_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cart_id)
        .bind(product_id)
        .bind(product_size_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_upsert_error)?;

        Self::touch_cart(&mut tx, cart_id).await?;
        tx.commit().await?;

        Ok(item)
    }

    async fn set_item_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<CartItem>> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET quantity = $3
            WHERE id = $1 AND cart_id = $2
            RETURNING id, cart_id, product_id, product_size_id, quantity, added_at
            "#,
        )
        .bind(item_id)
        .bind(cart_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await?;

        if item.is_some() {
            Self::touch_cart(&mut tx, cart_id).await?;
        }
        tx.commit().await?;

        Ok(item)
    }

    async fn delete_item(&self, cart_id: Uuid, item_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
            .bind(item_id)
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            Self::touch_cart(&mut tx, cart_id).await?;
        }
        tx.commit().await?;

        Ok(removed)
    }

    async fn clear_items(&self, cart_id: Uuid) -> AppResult<u64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            Self::touch_cart(&mut tx, cart_id).await?;
        }
        tx.commit().await?;

        Ok(removed)
    }
}

#[async_trait]
impl Catalog for PgStore {
    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        let product =
            sqlx::query_as::<_, Product>("SELECT id, name, price FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(product)
    }

    async fn find_product_size(&self, id: Uuid) -> AppResult<Option<ProductSize>> {
        let row = sqlx::query_as::<_, ProductSizeRow>(
            r#"
            SELECT ps.id, ps.product_id, s.name AS size_name, ps.price
            FROM product_sizes ps
            LEFT JOIN sizes s ON s.id = ps.size_id
            WHERE ps.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| ProductSize::new(row.id, row.product_id, row.size_name, row.price)))
    }
}
