//! In-memory e-commerce store (non-persistent).
//!
//! Products, cart items, orders and payments live in process memory behind a
//! single lock, so operations touching several tables (checkout, payment
//! confirmation) are applied atomically. Everything is lost on restart.

pub mod seed;
mod types;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

pub use types::{
    CartItem, CartLine, NewProduct, Order, OrderItem, OrderStatus, Payment, PaymentStatus,
    Product, SearchQuery,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A keyed table that remembers insertion order.
#[derive(Debug)]
struct Table<T> {
    rows: HashMap<Uuid, T>,
    order: Vec<Uuid>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T> Table<T> {
    fn insert(&mut self, id: Uuid, row: T) {
        if self.rows.insert(id, row).is_none() {
            self.order.push(id);
        }
    }

    fn get(&self, id: &Uuid) -> Option<&T> {
        self.rows.get(id)
    }

    fn get_mut(&mut self, id: &Uuid) -> Option<&mut T> {
        self.rows.get_mut(id)
    }

    fn remove(&mut self, id: &Uuid) -> Option<T> {
        let row = self.rows.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(row)
    }

    fn contains(&self, id: &Uuid) -> bool {
        self.rows.contains_key(id)
    }

    fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }
}

#[derive(Debug, Default)]
struct Tables {
    products: Table<Product>,
    cart: Table<CartItem>,
    orders: Table<Order>,
    payments: Table<Payment>,
}

impl Tables {
    fn active_product(&self, id: &Uuid) -> StoreResult<&Product> {
        self.products
            .get(id)
            .filter(|p| p.is_active)
            .ok_or(StoreError::NotFound("Product"))
    }

    fn cart_line(&self, item: &CartItem) -> StoreResult<CartLine> {
        let product = self
            .products
            .get(&item.product_id)
            .ok_or(StoreError::NotFound("Product"))?;
        Ok(CartLine {
            id: item.id,
            product: product.clone(),
            quantity: item.quantity,
        })
    }
}

/// Shared handle to the store. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Database {
    tables: Arc<RwLock<Tables>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────

    pub async fn create_product(&self, new: NewProduct) -> StoreResult<Product> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Validation("name must not be empty".to_string()));
        }
        if new.price < 0 {
            return Err(StoreError::Validation("price must be >= 0".to_string()));
        }
        if new.stock_quantity < 0 {
            return Err(StoreError::Validation(
                "stock_quantity must be >= 0".to_string(),
            ));
        }

        let product = Product {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            price: new.price,
            stock_quantity: new.stock_quantity,
            category: new.category,
            image_url: new.image_url,
            rating: new.rating,
            review_count: new.review_count,
            is_active: true,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(product)
    }

    /// Active products in catalog order.
    pub async fn list_products(&self) -> Vec<Product> {
        self.tables
            .read()
            .await
            .products
            .iter()
            .filter(|p| p.is_active)
            .cloned()
            .collect()
    }

    pub async fn search_products(&self, query: &SearchQuery) -> Vec<Product> {
        let needle = query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let category = query.category.as_deref().filter(|c| !c.is_empty());
        // A zero bound means "no bound".
        let min_price = query.min_price.filter(|&v| v != 0);
        let max_price = query.max_price.filter(|&v| v != 0);

        let mut results: Vec<Product> = self
            .list_products()
            .await
            .into_iter()
            .filter(|p| {
                needle
                    .as_ref()
                    .map_or(true, |n| p.name.to_lowercase().contains(n.as_str()))
            })
            .filter(|p| category.map_or(true, |c| p.category == c))
            .filter(|p| min_price.map_or(true, |min| p.price >= min))
            .filter(|p| max_price.map_or(true, |max| p.price <= max))
            .collect();

        match query.sort.as_deref() {
            Some("price_asc") => results.sort_by_key(|p| p.price),
            Some("price_desc") => results.sort_by(|a, b| b.price.cmp(&a.price)),
            _ => {}
        }
        results
    }

    /// Distinct categories of active products, sorted.
    pub async fn list_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .list_products()
            .await
            .into_iter()
            .map(|p| p.category)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        categories.sort();
        categories
    }

    pub async fn get_product(&self, id: Uuid) -> StoreResult<Product> {
        self.tables.read().await.active_product(&id).cloned()
    }

    /// Soft delete: the product stays referenced by carts and orders but is
    /// hidden from the catalog.
    pub async fn deactivate_product(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let product = tables
            .products
            .get_mut(&id)
            .filter(|p| p.is_active)
            .ok_or(StoreError::NotFound("Product"))?;
        product.is_active = false;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cart
    // ─────────────────────────────────────────────────────────────────────

    pub async fn get_cart(&self) -> Vec<CartLine> {
        let tables = self.tables.read().await;
        tables
            .cart
            .iter()
            .filter_map(|item| tables.cart_line(item).ok())
            .collect()
    }

    pub async fn add_to_cart(&self, product_id: Uuid, quantity: i64) -> StoreResult<CartLine> {
        validate_quantity(quantity)?;
        let mut tables = self.tables.write().await;
        tables.active_product(&product_id)?;

        let item = CartItem {
            id: Uuid::new_v4(),
            product_id,
            quantity,
            created_at: Utc::now(),
        };
        let line = tables.cart_line(&item)?;
        tables.cart.insert(item.id, item);
        Ok(line)
    }

    pub async fn update_cart_item(&self, id: Uuid, quantity: i64) -> StoreResult<CartLine> {
        validate_quantity(quantity)?;
        let mut tables = self.tables.write().await;
        let item = tables
            .cart
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Cart item"))?;
        item.quantity = quantity;
        let item = item.clone();
        tables.cart_line(&item)
    }

    pub async fn remove_cart_item(&self, id: Uuid) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .cart
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound("Cart item"))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Orders
    // ─────────────────────────────────────────────────────────────────────

    /// Turn cart items into a pending order and remove them from the cart.
    ///
    /// Validation happens before any mutation: if one id is unknown the
    /// cart is left untouched.
    pub async fn create_order(&self, cart_item_ids: &[Uuid]) -> StoreResult<Order> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = cart_item_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if ids.is_empty() {
            return Err(StoreError::Validation(
                "an order needs at least one cart item".to_string(),
            ));
        }

        let mut tables = self.tables.write().await;
        let mut items = Vec::with_capacity(ids.len());
        let mut total = 0i64;
        for id in &ids {
            let cart_item = tables.cart.get(id).ok_or(StoreError::NotFound("Cart item"))?;
            let product = tables
                .products
                .get(&cart_item.product_id)
                .ok_or(StoreError::NotFound("Product"))?;
            total = product
                .price
                .checked_mul(cart_item.quantity)
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(|| StoreError::Validation("order total is too large".to_string()))?;
            items.push(OrderItem {
                product_id: product.id,
                quantity: cart_item.quantity,
                price_at_purchase: product.price,
            });
        }

        for id in &ids {
            tables.cart.remove(id);
        }

        let order = Order {
            id: Uuid::new_v4(),
            total_amount: total,
            status: OrderStatus::Pending,
            items,
            created_at: Utc::now(),
        };
        tables.orders.insert(order.id, order.clone());
        tracing::debug!(order_id = %order.id, total = order.total_amount, "Order created");
        Ok(order)
    }

    pub async fn list_orders(&self) -> Vec<Order> {
        self.tables.read().await.orders.iter().cloned().collect()
    }

    pub async fn get_order(&self, id: Uuid) -> StoreResult<Order> {
        self.tables
            .read()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("Order"))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Payments (mocked)
    // ─────────────────────────────────────────────────────────────────────

    pub async fn create_payment_intent(&self, order_id: Uuid) -> StoreResult<Payment> {
        let mut tables = self.tables.write().await;
        let order = tables
            .orders
            .get(&order_id)
            .ok_or(StoreError::NotFound("Order"))?;
        if order.status == OrderStatus::Paid {
            return Err(StoreError::Conflict(format!(
                "Order {} is already paid",
                order_id
            )));
        }

        let payment = Payment {
            id: Uuid::new_v4(),
            order_id,
            provider: "stripe".to_string(),
            provider_payment_id: format!("pi_{}", Uuid::new_v4().simple()),
            amount: order.total_amount,
            currency: "usd".to_string(),
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        };
        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    /// Mark the payment succeeded and its order paid. Returns the order id.
    pub async fn confirm_payment(&self, payment_id: Uuid) -> StoreResult<Uuid> {
        let mut tables = self.tables.write().await;
        let order_id = tables
            .payments
            .get(&payment_id)
            .map(|p| p.order_id)
            .ok_or(StoreError::NotFound("Payment"))?;
        if !tables.orders.contains(&order_id) {
            return Err(StoreError::NotFound("Order"));
        }

        if let Some(payment) = tables.payments.get_mut(&payment_id) {
            payment.status = PaymentStatus::Succeeded;
        }
        if let Some(order) = tables.orders.get_mut(&order_id) {
            order.status = OrderStatus::Paid;
        }
        tracing::debug!(payment_id = %payment_id, order_id = %order_id, "Payment confirmed");
        Ok(order_id)
    }

    pub async fn get_payment(&self, id: Uuid) -> StoreResult<Payment> {
        self.tables
            .read()
            .await
            .payments
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound("Payment"))
    }
}

fn validate_quantity(quantity: i64) -> StoreResult<()> {
    if quantity > 0 {
        Ok(())
    } else {
        Err(StoreError::Validation(
            "quantity must be greater than 0".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price: i64, category: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: format!("{} description", name),
            price,
            stock_quantity: 10,
            category: category.to_string(),
            image_url: "https://example.com/item.jpg".to_string(),
            rating: None,
            review_count: None,
        }
    }

    #[tokio::test]
    async fn oversized_order_total_is_rejected() {
        let db = Database::new();
        let product = db
            .create_product(new_product("Gold Yacht 1", i64::MAX / 2 + 1, "Luxury"))
            .await
            .expect("create product");
        let line = db.add_to_cart(product.id, 2).await.expect("add to cart");

        let err = db.create_order(&[line.id]).await.expect_err("overflow");
        assert_eq!(
            err,
            StoreError::Validation("order total is too large".to_string())
        );
        // Nothing was taken out of the cart.
        assert_eq!(db.get_cart().await.len(), 1);
        assert!(db.list_orders().await.is_empty());
    }

    #[tokio::test]
    async fn add_to_cart_then_read_cart_returns_item() {
        let db = Database::new();
        let product = db
            .create_product(new_product("Pro Laptop 100", 99_900, "Electronics"))
            .await
            .expect("create product");

        let line = db.add_to_cart(product.id, 2).await.expect("add to cart");
        let cart = db.get_cart().await;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].id, line.id);
        assert_eq!(cart[0].product.id, product.id);
        assert_eq!(cart[0].quantity, 2);
    }

    #[tokio::test]
    async fn create_order_sums_prices_and_empties_cart() {
        let db = Database::new();
        let a = db
            .create_product(new_product("Mini Kettle 200", 1_250, "Home & Kitchen"))
            .await
            .expect("create a");
        let b = db
            .create_product(new_product("Elite Novel 300", 899, "Books"))
            .await
            .expect("create b");
        let line_a = db.add_to_cart(a.id, 3).await.expect("add a");
        let line_b = db.add_to_cart(b.id, 1).await.expect("add b");
        let untouched = db.add_to_cart(b.id, 5).await.expect("add untouched");

        let order = db
            .create_order(&[line_a.id, line_b.id])
            .await
            .expect("create order");

        assert_eq!(order.total_amount, 3 * 1_250 + 899);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price_at_purchase, 1_250);

        let cart = db.get_cart().await;
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].id, untouched.id);
    }

    #[tokio::test]
    async fn create_order_with_unknown_item_leaves_cart_untouched() {
        let db = Database::new();
        let product = db
            .create_product(new_product("Basic Hat 101", 1_000, "Clothing"))
            .await
            .expect("create product");
        let line = db.add_to_cart(product.id, 1).await.expect("add");

        let err = db
            .create_order(&[line.id, Uuid::new_v4()])
            .await
            .expect_err("unknown cart item");

        assert_eq!(err, StoreError::NotFound("Cart item"));
        assert_eq!(db.get_cart().await.len(), 1);
        assert!(db.list_orders().await.is_empty());
    }

    #[tokio::test]
    async fn create_order_collapses_duplicates_and_rejects_empty() {
        let db = Database::new();
        let product = db
            .create_product(new_product("Smart Lamp 555", 2_000, "Home & Kitchen"))
            .await
            .expect("create product");
        let line = db.add_to_cart(product.id, 2).await.expect("add");

        let order = db
            .create_order(&[line.id, line.id])
            .await
            .expect("create order");
        assert_eq!(order.total_amount, 4_000);
        assert_eq!(order.items.len(), 1);

        assert!(matches!(
            db.create_order(&[]).await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn confirming_payment_marks_order_paid() {
        let db = Database::new();
        let product = db
            .create_product(new_product("Ultra Camera 900", 45_000, "Electronics"))
            .await
            .expect("create product");
        let line = db.add_to_cart(product.id, 1).await.expect("add");
        let order = db.create_order(&[line.id]).await.expect("order");

        let payment = db
            .create_payment_intent(order.id)
            .await
            .expect("payment intent");
        assert_eq!(payment.amount, 45_000);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.provider_payment_id.starts_with("pi_"));

        let order_id = db.confirm_payment(payment.id).await.expect("confirm");
        assert_eq!(order_id, order.id);
        assert_eq!(
            db.get_order(order.id).await.expect("order").status,
            OrderStatus::Paid
        );
        assert_eq!(
            db.get_payment(payment.id).await.expect("payment").status,
            PaymentStatus::Succeeded
        );

        // Paid orders do not accept new intents; confirming twice is harmless.
        assert!(matches!(
            db.create_payment_intent(order.id).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(db.confirm_payment(payment.id).await, Ok(order.id));
    }

    #[tokio::test]
    async fn search_filters_and_sorts() {
        let db = Database::new();
        for (name, price, category) in [
            ("Pro Phone 111", 80_000, "Electronics"),
            ("Mini Phone 222", 30_000, "Electronics"),
            ("Classic Phone Case 333", 1_500, "Clothing"),
            ("Smart Speaker 444", 12_000, "Electronics"),
        ] {
            db.create_product(new_product(name, price, category))
                .await
                .expect("create");
        }

        let phones = db
            .search_products(&SearchQuery {
                q: Some("PHONE".to_string()),
                category: Some("Electronics".to_string()),
                sort: Some("price_asc".to_string()),
                ..Default::default()
            })
            .await;
        let names: Vec<_> = phones.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Mini Phone 222", "Pro Phone 111"]);

        let ranged = db
            .search_products(&SearchQuery {
                min_price: Some(10_000),
                max_price: Some(50_000),
                sort: Some("price_desc".to_string()),
                ..Default::default()
            })
            .await;
        let prices: Vec<_> = ranged.iter().map(|p| p.price).collect();
        assert_eq!(prices, [30_000, 12_000]);

        // A zero upper bound is ignored rather than matching nothing.
        let unbounded = db
            .search_products(&SearchQuery {
                max_price: Some(0),
                ..Default::default()
            })
            .await;
        assert_eq!(unbounded.len(), 4);
    }

    #[tokio::test]
    async fn deactivated_products_disappear_from_catalog() {
        let db = Database::new();
        let keep = db
            .create_product(new_product("Premium Scarf 700", 3_000, "Clothing"))
            .await
            .expect("create keep");
        let gone = db
            .create_product(new_product("Legendary Serum 701", 5_000, "Beauty"))
            .await
            .expect("create gone");

        db.deactivate_product(gone.id).await.expect("deactivate");

        assert_eq!(db.list_products().await, vec![keep]);
        assert_eq!(db.list_categories().await, vec!["Clothing".to_string()]);
        assert_eq!(
            db.get_product(gone.id).await,
            Err(StoreError::NotFound("Product"))
        );
        assert_eq!(
            db.add_to_cart(gone.id, 1).await,
            Err(StoreError::NotFound("Product"))
        );
    }

    #[tokio::test]
    async fn cart_quantity_must_be_positive() {
        let db = Database::new();
        let product = db
            .create_product(new_product("Basic Socks 120", 500, "Clothing"))
            .await
            .expect("create");
        let line = db.add_to_cart(product.id, 1).await.expect("add");

        assert!(matches!(
            db.add_to_cart(product.id, 0).await,
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            db.update_cart_item(line.id, -2).await,
            Err(StoreError::Validation(_))
        ));

        let updated = db.update_cart_item(line.id, 4).await.expect("update");
        assert_eq!(updated.quantity, 4);

        db.remove_cart_item(line.id).await.expect("remove");
        assert_eq!(
            db.remove_cart_item(line.id).await,
            Err(StoreError::NotFound("Cart item"))
        );
    }
}
