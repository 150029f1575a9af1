//! Storage port for carts and the read-only catalog.
//!
//! Cart rules live in [`crate::services::cart_service`]; implementations of
//! these traits only persist and query records. Every method that mutates a
//! cart's items also refreshes the cart's `updated_at`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Cart, CartItem, CartLine, Product, ProductSize},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Looks up the cart for a session key without creating it.
    async fn find_cart(&self, session_key: &str) -> AppResult<Option<Cart>>;

    /// Returns the cart for a session key, creating it when absent.
    ///
    /// Must be atomic: concurrent callers with the same key get the same cart.
    async fn get_or_create_cart(&self, session_key: &str) -> AppResult<Cart>;

    /// Deletes a cart and, by cascade, all of its items.
    async fn delete_cart(&self, cart_id: Uuid) -> AppResult<bool>;

    /// Items of a cart joined with their catalog records, in insertion order.
    async fn list_lines(&self, cart_id: Uuid) -> AppResult<Vec<CartLine>>;

    /// Inserts a new item with `quantity`, or adds `quantity` to the existing
    /// item for the same (cart, product, size). Must be a single atomic step.
    async fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        product_size_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem>;

    /// Sets the quantity of an item owned by `cart_id`. `None` when the item
    /// does not belong to the cart. `quantity` is always positive.
    async fn set_item_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<CartItem>>;

    /// Deletes an item owned by `cart_id`; `false` when there was none.
    async fn delete_item(&self, cart_id: Uuid, item_id: Uuid) -> AppResult<bool>;

    /// Deletes every item of the cart and returns how many were removed.
    async fn clear_items(&self, cart_id: Uuid) -> AppResult<u64>;
}

/// Read-only view of the product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn find_product_size(&self, id: Uuid) -> AppResult<Option<ProductSize>>;
}
