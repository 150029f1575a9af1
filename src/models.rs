use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Zero with the two-digit scale used for currency columns.
pub fn zero_amount() -> Decimal {
    Decimal::new(0, 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Option<Decimal>,
}

/// A purchasable size of a product.
///
/// `label` is resolved when the record is built: the size name when the
/// catalog has one, otherwise the record's own default form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSize {
    pub id: Uuid,
    pub product_id: Uuid,
    pub label: String,
    pub price: Option<Decimal>,
}

impl ProductSize {
    pub fn new(
        id: Uuid,
        product_id: Uuid,
        size_name: Option<String>,
        price: Option<Decimal>,
    ) -> Self {
        let label = size_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("size {id}"));
        Self {
            id,
            product_id,
            label,
            price,
        }
    }
}

impl fmt::Display for ProductSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Cart {
    pub id: Uuid,
    pub session_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Display for Cart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cart {}", self.session_key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub product_size_id: Uuid,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

/// A cart item together with the catalog records it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
    pub size: ProductSize,
}

impl CartLine {
    /// Unit price: the size price wins over the product price.
    pub fn unit_price(&self) -> Option<Decimal> {
        self.size.price.or(self.product.price)
    }

    /// Line total in exact decimal arithmetic; `0.00` when no price is known.
    pub fn total_price(&self) -> Decimal {
        match self.unit_price() {
            Some(price) => price * Decimal::from(self.item.quantity),
            None => zero_amount(),
        }
    }
}

impl fmt::Display for CartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} x {}",
            self.product.name, self.size, self.item.quantity
        )
    }
}

/// A cart and its lines in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct CartContents {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
}

impl CartContents {
    pub fn total_items(&self) -> i64 {
        self.lines
            .iter()
            .map(|line| i64::from(line.item.quantity))
            .sum()
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .fold(zero_amount(), |acc, line| acc + line.total_price())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn find_line(&self, item_id: Uuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item.id == item_id)
    }
}
