//! Shopping tools: thin clients over the store HTTP API.

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::Tool;
use crate::store::{CartLine, Order, Payment, Product};

/// Most search hits rendered for the model.
const MAX_SEARCH_RESULTS: usize = 50;

/// Render integer cents as dollars, e.g. `$12.05`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}

/// HTTP client for the store API.
#[derive(Clone)]
pub struct ShopClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

#[derive(Deserialize)]
struct PaymentConfirmation {
    order_id: Uuid,
}

impl ShopClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> anyhow::Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorDetail>(&body)
                .map(|e| e.detail)
                .unwrap_or(body);
            return Err(anyhow::anyhow!("{}: {}", status, detail));
        }
        Ok(response.json().await?)
    }

    pub async fn search(&self, params: &[(&str, String)]) -> anyhow::Result<Vec<Product>> {
        let response = self
            .http
            .get(self.url("/products/search"))
            .query(params)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn product(&self, id: &str) -> anyhow::Result<Product> {
        let response = self
            .http
            .get(self.url(&format!("/products/{}", id)))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn categories(&self) -> anyhow::Result<Vec<String>> {
        let response = self
            .http
            .get(self.url("/products/categories"))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn cart(&self) -> anyhow::Result<Vec<CartLine>> {
        let response = self.http.get(self.url("/cart")).send().await?;
        Self::decode(response).await
    }

    pub async fn add_to_cart(&self, product_id: Uuid, quantity: i64) -> anyhow::Result<CartLine> {
        let response = self
            .http
            .post(self.url("/cart"))
            .json(&json!({ "product_id": product_id, "quantity": quantity }))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn create_order(&self, cart_item_ids: &[Uuid]) -> anyhow::Result<Order> {
        let response = self
            .http
            .post(self.url("/orders"))
            .json(&json!({ "cart_item_ids": cart_item_ids }))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn create_payment_intent(&self, order_id: Uuid) -> anyhow::Result<Payment> {
        let response = self
            .http
            .post(self.url("/payments/create-intent"))
            .json(&json!({ "order_id": order_id }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Returns the id of the order that is now paid.
    pub async fn confirm_payment(&self, payment_id: Uuid) -> anyhow::Result<Uuid> {
        let response = self
            .http
            .post(self.url("/payments/confirm"))
            .json(&json!({ "payment_id": payment_id }))
            .send()
            .await?;
        let confirmation: PaymentConfirmation = Self::decode(response).await?;
        Ok(confirmation.order_id)
    }
}

fn line_total(item: &CartLine) -> anyhow::Result<i64> {
    item.product
        .price
        .checked_mul(item.quantity)
        .ok_or_else(|| anyhow::anyhow!("subtotal of '{}' is too large", item.product.name))
}

fn uuid_arg(args: &Value, key: &str) -> anyhow::Result<Uuid> {
    let raw = args[key]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' argument", key))?;
    Uuid::parse_str(raw.trim()).map_err(|_| anyhow::anyhow!("'{}' is not a valid id: {}", key, raw))
}

/// Search the catalog by name, category and price range.
pub struct SearchProducts {
    client: ShopClient,
}

impl SearchProducts {
    pub fn new(client: ShopClient) -> Self {
        Self { client }
    }

    fn params(args: &Value, query: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(q) = query {
            params.push(("q", q.to_string()));
        }
        if let Some(category) = args["category"].as_str() {
            params.push(("category", category.to_string()));
        }
        if let Some(min) = args["min_price"].as_i64() {
            params.push(("min_price", min.to_string()));
        }
        if let Some(max) = args["max_price"].as_i64() {
            params.push(("max_price", max.to_string()));
        }
        if let Some(sort) = args["sort"].as_str() {
            params.push(("sort", sort.to_string()));
        }
        params
    }
}

#[async_trait]
impl Tool for SearchProducts {
    fn name(&self) -> &str {
        "search_products"
    }

    fn description(&self) -> &str {
        "Search for products in the store. You can filter by a search query (q), category, and price range (in cents). If searching for a plural term (e.g., 'phones') returns nothing, the singular ('phone') is tried automatically."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "q": { "type": "string", "description": "Text to look for in product names" },
                "category": { "type": "string", "description": "Exact category name" },
                "min_price": { "type": "integer", "description": "Minimum price in cents" },
                "max_price": { "type": "integer", "description": "Maximum price in cents" },
                "sort": {
                    "type": "string",
                    "enum": ["price_asc", "price_desc"],
                    "description": "Optional price ordering"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let query = args["q"].as_str().map(str::trim).filter(|q| !q.is_empty());

        let mut products = self
            .client
            .search(&Self::params(&args, query))
            .await
            .context("searching products failed")?;

        if products.is_empty() {
            if let Some(singular) = query.and_then(|q| q.strip_suffix('s')).filter(|s| !s.is_empty()) {
                tracing::debug!("No results for '{:?}', retrying with '{}'", query, singular);
                products = self
                    .client
                    .search(&Self::params(&args, Some(singular)))
                    .await
                    .context("searching products failed")?;
            }
        }

        if products.is_empty() {
            return Ok("No products found. Try a broader search or singular terms.".to_string());
        }

        let total = products.len();
        let mut lines: Vec<String> = products
            .iter()
            .take(MAX_SEARCH_RESULTS)
            .map(|p| {
                format!(
                    "- {} (ID: {}) | Price: {} | Category: {} | Image: {}",
                    p.name,
                    p.id,
                    format_cents(p.price),
                    p.category,
                    p.image_url
                )
            })
            .collect();
        if total > MAX_SEARCH_RESULTS {
            lines.push(format!(
                "... and {} more. Narrow the search to see them.",
                total - MAX_SEARCH_RESULTS
            ));
        }
        Ok(lines.join("\n"))
    }
}

/// Full details for one product.
pub struct GetProductDetails {
    client: ShopClient,
}

impl GetProductDetails {
    pub fn new(client: ShopClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetProductDetails {
    fn name(&self) -> &str {
        "get_product_details"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific product by its ID. Returns name, description, price, category, stock quantity, and rating info."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product_id": { "type": "string", "description": "Product ID from a search result" }
            },
            "required": ["product_id"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let id = uuid_arg(&args, "product_id").context("getting product details failed")?;
        let p = self
            .client
            .product(&id.to_string())
            .await
            .context("getting product details failed")?;

        let rating = match (p.rating, p.review_count) {
            (Some(rating), Some(count)) => format!("{} ({} reviews)", rating, count),
            (Some(rating), None) => rating.to_string(),
            _ => "n/a".to_string(),
        };
        Ok(format!(
            "Name: {}\nID: {}\nDescription: {}\nPrice: {}\nCategory: {}\nStock: {}\nImage: {}\nRating: {}",
            p.name,
            p.id,
            p.description,
            format_cents(p.price),
            p.category,
            p.stock_quantity,
            p.image_url,
            rating
        ))
    }
}

pub struct AddToCart {
    client: ShopClient,
}

impl AddToCart {
    pub fn new(client: ShopClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for AddToCart {
    fn name(&self) -> &str {
        "add_to_cart"
    }

    fn description(&self) -> &str {
        "Add a product to the shopping cart. Returns confirmation with quantity and cart item ID."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product_id": { "type": "string", "description": "Product ID to add" },
                "quantity": { "type": "integer", "description": "How many to add (default: 1)" }
            },
            "required": ["product_id"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let product_id = uuid_arg(&args, "product_id").context("adding to cart failed")?;
        let quantity = args["quantity"].as_i64().unwrap_or(1);
        let line = self
            .client
            .add_to_cart(product_id, quantity)
            .await
            .context("adding to cart failed")?;
        Ok(format!(
            "Added {} of '{}' to your cart. Cart Item ID: {}",
            line.quantity, line.product.name, line.id
        ))
    }
}

pub struct ViewCart {
    client: ShopClient,
}

impl ViewCart {
    pub fn new(client: ShopClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ViewCart {
    fn name(&self) -> &str {
        "view_cart"
    }

    fn description(&self) -> &str {
        "View the current contents of the shopping cart. Lists each item with quantity and subtotal, and shows the total price."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<String> {
        let items = self.client.cart().await.context("viewing cart failed")?;
        if items.is_empty() {
            return Ok("Your cart is empty.".to_string());
        }

        let mut total = 0i64;
        let mut lines = Vec::with_capacity(items.len() + 1);
        for item in &items {
            let subtotal = line_total(item).context("viewing cart failed")?;
            total = total
                .checked_add(subtotal)
                .ok_or_else(|| anyhow::anyhow!("cart total is too large"))
                .context("viewing cart failed")?;
            lines.push(format!(
                "- {} (Cart Item ID: {}) | Qty: {} | Subtotal: {} | Image: {}",
                item.product.name,
                item.id,
                item.quantity,
                format_cents(subtotal),
                item.product.image_url
            ));
        }
        lines.push(format!("\nTotal: {}", format_cents(total)));
        Ok(lines.join("\n"))
    }
}

/// Create an order. Runs only after the user approves.
pub struct Checkout {
    client: ShopClient,
}

impl Checkout {
    pub fn new(client: ShopClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for Checkout {
    fn name(&self) -> &str {
        "checkout"
    }

    fn description(&self) -> &str {
        "Proceed to checkout and create an order. Orders every item in the cart unless specific cart_item_ids are given. Returns the order ID and total amount. The user is asked to approve before the order is placed."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "cart_item_ids": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Optional: only order these cart items"
                }
            }
        })
    }

    fn requires_approval(&self) -> bool {
        true
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let requested: Option<Vec<Uuid>> = match args["cart_item_ids"].as_array() {
            Some(ids) if !ids.is_empty() => Some(
                ids.iter()
                    .map(|v| {
                        v.as_str()
                            .and_then(|s| Uuid::parse_str(s.trim()).ok())
                            .ok_or_else(|| anyhow::anyhow!("invalid cart item id: {}", v))
                    })
                    .collect::<anyhow::Result<_>>()
                    .context("checkout failed")?,
            ),
            _ => None,
        };

        let ids = match requested {
            Some(ids) => ids,
            None => {
                let cart = self.client.cart().await.context("checkout failed")?;
                if cart.is_empty() {
                    return Ok("Cannot checkout: your cart is empty.".to_string());
                }
                cart.into_iter().map(|item| item.id).collect()
            }
        };

        let order = self
            .client
            .create_order(&ids)
            .await
            .context("checkout failed")?;
        Ok(format!(
            "Order created successfully! Order ID: {} | Total: {}",
            order.id,
            format_cents(order.total_amount)
        ))
    }
}

pub struct ListCategories {
    client: ShopClient,
}

impl ListCategories {
    pub fn new(client: ShopClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ListCategories {
    fn name(&self) -> &str {
        "list_categories"
    }

    fn description(&self) -> &str {
        "Get a list of all available product categories."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: Value) -> anyhow::Result<String> {
        let categories = self
            .client
            .categories()
            .await
            .context("listing categories failed")?;
        Ok(format!("Available categories: {}", categories.join(", ")))
    }
}

/// Pay for an order through the mocked payment flow.
pub struct Pay {
    client: ShopClient,
}

impl Pay {
    pub fn new(client: ShopClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for Pay {
    fn name(&self) -> &str {
        "pay"
    }

    fn description(&self) -> &str {
        "Pay for an existing order by order ID. Returns the transaction ID if successful."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "order_id": { "type": "string", "description": "Order ID returned by checkout" }
            },
            "required": ["order_id"]
        })
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let order_id = uuid_arg(&args, "order_id").context("payment failed")?;
        let payment = self
            .client
            .create_payment_intent(order_id)
            .await
            .context("payment failed")?;
        self.client
            .confirm_payment(payment.id)
            .await
            .context("payment failed")?;
        Ok(format!(
            "Payment successful for Order {}! Transaction ID: {}",
            order_id, payment.id
        ))
    }
}
