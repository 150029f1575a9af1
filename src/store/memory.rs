use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Cart, CartItem, CartLine, Product, ProductSize},
    store::{CartStore, Catalog},
};

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<Uuid, Product>,
    sizes: HashMap<Uuid, ProductSize>,
    carts: HashMap<Uuid, Cart>,
    // Kept in insertion order.
    items: Vec<CartItem>,
}

impl Inner {
    fn touch_cart(&mut self, cart_id: Uuid) {
        if let Some(cart) = self.carts.get_mut(&cart_id) {
            cart.updated_at = Utc::now();
        }
    }
}

/// Process-local store used when no database is configured, and in tests.
///
/// A single lock guards all state, so every trait method is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a catalog product.
    pub async fn insert_product(&self, product: Product) {
        let mut inner = self.inner.lock().await;
        inner.products.insert(product.id, product);
    }

    /// Adds (or replaces) a catalog size. Items pointing at a replaced size
    /// see the new record.
    pub async fn insert_product_size(&self, size: ProductSize) {
        let mut inner = self.inner.lock().await;
        inner.sizes.insert(size.id, size);
    }

    pub async fn item_count(&self) -> usize {
        self.inner.lock().await.items.len()
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn find_cart(&self, session_key: &str) -> AppResult<Option<Cart>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .carts
            .values()
            .find(|cart| cart.session_key == session_key)
            .cloned())
    }

    async fn get_or_create_cart(&self, session_key: &str) -> AppResult<Cart> {
        let mut inner = self.inner.lock().await;
        if let Some(cart) = inner
            .carts
            .values()
            .find(|cart| cart.session_key == session_key)
        {
            return Ok(cart.clone());
        }

        let now = Utc::now();
        let cart = Cart {
            id: Uuid::new_v4(),
            session_key: session_key.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    async fn delete_cart(&self, cart_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        if inner.carts.remove(&cart_id).is_none() {
            return Ok(false);
        }
        inner.items.retain(|item| item.cart_id != cart_id);
        Ok(true)
    }

    async fn list_lines(&self, cart_id: Uuid) -> AppResult<Vec<CartLine>> {
        let inner = self.inner.lock().await;
        let mut lines = Vec::new();
        for item in inner.items.iter().filter(|item| item.cart_id == cart_id) {
            let product = inner.products.get(&item.product_id);
            let size = inner.sizes.get(&item.product_size_id);
            let (Some(product), Some(size)) = (product, size) else {
                return Err(AppError::Internal(anyhow::anyhow!(
                    "cart item {} references a missing catalog record",
                    item.id
                )));
            };
            lines.push(CartLine {
                item: item.clone(),
                product: product.clone(),
                size: size.clone(),
            });
        }
        Ok(lines)
    }

    async fn upsert_item(
        &self,
        cart_id: Uuid,
        product_id: Uuid,
        product_size_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem> {
        let mut inner = self.inner.lock().await;
        if !inner.carts.contains_key(&cart_id) {
            return Err(AppError::NotFound);
        }
        if !inner.products.contains_key(&product_id) {
            return Err(AppError::BadRequest("product not found".to_string()));
        }
        if !inner.sizes.contains_key(&product_size_id) {
            return Err(AppError::BadRequest("product size not found".to_string()));
        }

        let position = inner.items.iter().position(|item| {
            item.cart_id == cart_id
                && item.product_id == product_id
                && item.product_size_id == product_size_id
        });

        let item = match position {
            Some(index) => {
                let item = &mut inner.items[index];
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| AppError::BadRequest("quantity is too large".to_string()))?;
                item.clone()
            }
            None => {
                let item = CartItem {
                    id: Uuid::new_v4(),
                    cart_id,
                    product_id,
                    product_size_id,
                    quantity,
                    added_at: Utc::now(),
                };
                inner.items.push(item.clone());
                item
            }
        };

        inner.touch_cart(cart_id);
        Ok(item)
    }

    async fn set_item_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> AppResult<Option<CartItem>> {
        let mut inner = self.inner.lock().await;
        let updated = inner
            .items
            .iter_mut()
            .find(|item| item.id == item_id && item.cart_id == cart_id)
            .map(|item| {
                item.quantity = quantity;
                item.clone()
            });

        if updated.is_some() {
            inner.touch_cart(cart_id);
        }
        Ok(updated)
    }

    async fn delete_item(&self, cart_id: Uuid, item_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.items.len();
        inner
            .items
            .retain(|item| !(item.id == item_id && item.cart_id == cart_id));
        let removed = inner.items.len() != before;

        if removed {
            inner.touch_cart(cart_id);
        }
        Ok(removed)
    }

    async fn clear_items(&self, cart_id: Uuid) -> AppResult<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.items.len();
        inner.items.retain(|item| item.cart_id != cart_id);
        let removed = (before - inner.items.len()) as u64;

        if removed > 0 {
            inner.touch_cart(cart_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl Catalog for MemoryStore {
    async fn find_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.inner.lock().await.products.get(&id).cloned())
    }

    async fn find_product_size(&self, id: Uuid) -> AppResult<Option<ProductSize>> {
        Ok(self.inner.lock().await.sizes.get(&id).cloned())
    }
}
