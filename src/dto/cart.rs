use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{CartContents, CartItem, CartLine},
    services::cart_service::DEFAULT_QUANTITY,
};

fn default_quantity() -> i32 {
    DEFAULT_QUANTITY
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub product_size_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    /// Zero or less removes the item.
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineDto {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_size_id: Uuid,
    pub product_name: String,
    pub size_label: String,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub total_price: Decimal,
    pub label: String,
}

impl From<&CartLine> for CartLineDto {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.item.id,
            product_id: line.product.id,
            product_size_id: line.size.id,
            product_name: line.product.name.clone(),
            size_label: line.size.label.clone(),
            quantity: line.item.quantity,
            unit_price: line.unit_price(),
            total_price: line.total_price(),
            label: line.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub id: Uuid,
    pub session_key: String,
    pub items: Vec<CartLineDto>,
    pub total_items: i64,
    pub subtotal: Decimal,
}

impl From<&CartContents> for CartView {
    fn from(contents: &CartContents) -> Self {
        Self {
            id: contents.cart.id,
            session_key: contents.cart.session_key.clone(),
            items: contents.lines.iter().map(CartLineDto::from).collect(),
            total_items: contents.total_items(),
            subtotal: contents.subtotal(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub item: CartItem,
    pub cart: CartView,
}
