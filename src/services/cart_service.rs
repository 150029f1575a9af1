//! Cart operations.
//!
//! Every function takes the storage port explicitly; nothing here knows how
//! records are persisted. Not-found outcomes of item mutations are reported
//! as `Ok(false)`, never as errors.

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Cart, CartContents, CartItem, Product, ProductSize},
    store::{CartStore, Catalog},
};

/// Quantity used when a caller adds a product without specifying one.
pub const DEFAULT_QUANTITY: i32 = 1;

pub const MAX_SESSION_KEY_LEN: usize = 40;

pub fn validate_session_key(session_key: &str) -> AppResult<()> {
    let session_key = session_key.trim();
    if session_key.is_empty() {
        return Err(AppError::BadRequest("session key is empty".to_string()));
    }
    if session_key.len() > MAX_SESSION_KEY_LEN {
        return Err(AppError::BadRequest(format!(
            "session key is longer than {MAX_SESSION_KEY_LEN} characters"
        )));
    }
    Ok(())
}

/// Returns the cart for `session_key`, creating an empty one on first use.
pub async fn open_cart(store: &dyn CartStore, session_key: &str) -> AppResult<Cart> {
    validate_session_key(session_key)?;
    store.get_or_create_cart(session_key.trim()).await
}

/// Looks up a cart without creating it.
pub async fn find_cart(store: &dyn CartStore, session_key: &str) -> AppResult<Option<Cart>> {
    validate_session_key(session_key)?;
    store.find_cart(session_key.trim()).await
}

pub async fn load_contents(store: &dyn CartStore, cart: &Cart) -> AppResult<CartContents> {
    let lines = store.list_lines(cart.id).await?;
    Ok(CartContents {
        cart: cart.clone(),
        lines,
    })
}

/// Resolves catalog ids into the records `add_product` works with.
pub async fn resolve_selection(
    catalog: &dyn Catalog,
    product_id: Uuid,
    product_size_id: Uuid,
) -> AppResult<(Product, ProductSize)> {
    let product = catalog
        .find_product(product_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;
    let size = catalog
        .find_product_size(product_size_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("product size not found".to_string()))?;
    Ok((product, size))
}

/// Adds `quantity` of a product size to the cart.
///
/// The first add creates the item; later adds of the same product and size
/// increase its quantity. Quantities below 1 are rejected.
pub async fn add_product(
    store: &dyn CartStore,
    cart: &Cart,
    product: &Product,
    size: &ProductSize,
    quantity: i32,
) -> AppResult<CartItem> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if size.product_id != product.id {
        return Err(AppError::BadRequest(
            "product size does not belong to product".to_string(),
        ));
    }

    let item = store
        .upsert_item(cart.id, product.id, size.id, quantity)
        .await?;

    tracing::debug!(
        cart_id = %cart.id,
        item_id = %item.id,
        added = quantity,
        quantity = item.quantity,
        "product added to cart"
    );
    Ok(item)
}

pub async fn remove_item(store: &dyn CartStore, cart: &Cart, item_id: Uuid) -> AppResult<bool> {
    let removed = store.delete_item(cart.id, item_id).await?;
    if removed {
        tracing::debug!(cart_id = %cart.id, item_id = %item_id, "cart item removed");
    }
    Ok(removed)
}

/// Sets an item's quantity; zero or less removes the item.
///
/// Returns `false` when the item is not in this cart.
pub async fn update_item_quantity(
    store: &dyn CartStore,
    cart: &Cart,
    item_id: Uuid,
    quantity: i32,
) -> AppResult<bool> {
    if quantity <= 0 {
        return remove_item(store, cart, item_id).await;
    }

    let updated = store.set_item_quantity(cart.id, item_id, quantity).await?;
    if updated.is_some() {
        tracing::debug!(cart_id = %cart.id, item_id = %item_id, quantity, "cart item updated");
    }
    Ok(updated.is_some())
}

pub async fn clear(store: &dyn CartStore, cart: &Cart) -> AppResult<()> {
    let removed = store.clear_items(cart.id).await?;
    tracing::debug!(cart_id = %cart.id, removed, "cart cleared");
    Ok(())
}

/// Deletes the cart together with its items.
pub async fn delete_cart(store: &dyn CartStore, cart: &Cart) -> AppResult<bool> {
    let deleted = store.delete_cart(cart.id).await?;
    if deleted {
        tracing::info!(cart_id = %cart.id, "cart deleted");
    }
    Ok(deleted)
}
