//! Records held by the in-memory store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product. Prices are integer cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock_quantity: i64,
    pub category: String,
    pub image_url: String,
    /// Average review score (seeded products only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(skip)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a product.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock_quantity: i64,
    pub category: String,
    pub image_url: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub review_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// A cart entry joined with its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i64,
    pub price_at_purchase: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

/// A mocked payment intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub provider: String,
    pub provider_payment_id: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Filters for product search. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<i64>,
    #[serde(default)]
    pub max_price: Option<i64>,
    /// `price_asc` or `price_desc`; anything else keeps catalog order
    #[serde(default)]
    pub sort: Option<String>,
}
