mod common;

use serde_json::{json, Value};
use storefront::api::{store_router, ErrorResponse, HealthResponse, PaymentConfirmResponse};
use storefront::store::{CartLine, Order, OrderStatus, Payment, Product};

use common::{spawn, stocked_store};

#[tokio::test]
async fn health_reports_ok() {
    let (db, _) = stocked_store().await;
    let base = spawn(store_router(db)).await;

    let health: HealthResponse = reqwest::get(format!("{}/health", base))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn cart_order_and_payment_flow() {
    let (db, products) = stocked_store().await;
    let base = spawn(store_router(db.clone())).await;
    let http = reqwest::Client::new();
    let football = &products[0];
    let mug = &products[3];

    let line: CartLine = http
        .post(format!("{}/cart", base))
        .json(&json!({ "product_id": football.id, "quantity": 2 }))
        .send()
        .await
        .expect("add football")
        .json()
        .await
        .expect("cart line");
    assert_eq!(line.product.id, football.id);
    assert_eq!(line.quantity, 2);

    // Quantity defaults to one.
    let mug_line: CartLine = http
        .post(format!("{}/cart", base))
        .json(&json!({ "product_id": mug.id }))
        .send()
        .await
        .expect("add mug")
        .json()
        .await
        .expect("cart line");
    assert_eq!(mug_line.quantity, 1);

    let updated: CartLine = http
        .put(format!("{}/cart/{}", base, mug_line.id))
        .query(&[("quantity", "3")])
        .send()
        .await
        .expect("update")
        .json()
        .await
        .expect("cart line");
    assert_eq!(updated.quantity, 3);

    let cart: Vec<CartLine> = http
        .get(format!("{}/cart", base))
        .send()
        .await
        .expect("cart")
        .json()
        .await
        .expect("json");
    assert_eq!(cart.len(), 2);

    let order: Order = http
        .post(format!("{}/orders", base))
        .json(&json!({ "cart_item_ids": [line.id, mug_line.id] }))
        .send()
        .await
        .expect("order")
        .json()
        .await
        .expect("json");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_amount, 2 * 2_999 + 3 * 1_250);
    assert_eq!(order.items.len(), 2);
    assert!(db.get_cart().await.is_empty());

    let payment: Payment = http
        .post(format!("{}/payments/create-intent", base))
        .json(&json!({ "order_id": order.id }))
        .send()
        .await
        .expect("intent")
        .json()
        .await
        .expect("json");
    assert_eq!(payment.amount, order.total_amount);
    assert_eq!(payment.currency, "usd");
    assert!(payment.provider_payment_id.starts_with("pi_"));

    let confirmed: PaymentConfirmResponse = http
        .post(format!("{}/payments/confirm", base))
        .json(&json!({ "payment_id": payment.id }))
        .send()
        .await
        .expect("confirm")
        .json()
        .await
        .expect("json");
    assert!(confirmed.success);
    assert_eq!(confirmed.order_id, order.id);

    let paid: Order = http
        .get(format!("{}/orders/{}", base, order.id))
        .send()
        .await
        .expect("order")
        .json()
        .await
        .expect("json");
    assert_eq!(paid.status, OrderStatus::Paid);

    // A paid order cannot get another intent.
    let again = http
        .post(format!("{}/payments/create-intent", base))
        .json(&json!({ "order_id": order.id }))
        .send()
        .await
        .expect("intent");
    assert_eq!(again.status(), reqwest::StatusCode::CONFLICT);
}

#[tokio::test]
async fn search_and_categories() {
    let (db, _) = stocked_store().await;
    let base = spawn(store_router(db)).await;
    let http = reqwest::Client::new();

    let sports: Vec<Product> = http
        .get(format!("{}/products/search", base))
        .query(&[("category", "Sports"), ("sort", "price_desc")])
        .send()
        .await
        .expect("search")
        .json()
        .await
        .expect("json");
    let names: Vec<_> = sports.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Trail Running Shoes", "Classic Football"]);

    let cheap: Vec<Product> = http
        .get(format!("{}/products/search", base))
        .query(&[("max_price", "3000"), ("min_price", "0")])
        .send()
        .await
        .expect("search")
        .json()
        .await
        .expect("json");
    assert_eq!(cheap.len(), 2);

    let by_name: Vec<Product> = http
        .get(format!("{}/products/search", base))
        .query(&[("q", "watch")])
        .send()
        .await
        .expect("search")
        .json()
        .await
        .expect("json");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].category, "Electronics");

    let categories: Vec<String> = http
        .get(format!("{}/products/categories", base))
        .send()
        .await
        .expect("categories")
        .json()
        .await
        .expect("json");
    assert_eq!(categories, ["Electronics", "Home", "Sports"]);
}

#[tokio::test]
async fn deleted_products_disappear_from_listings() {
    let (db, products) = stocked_store().await;
    let base = spawn(store_router(db)).await;
    let http = reqwest::Client::new();
    let mug = &products[3];

    let deleted: Value = http
        .delete(format!("{}/products/{}", base, mug.id))
        .send()
        .await
        .expect("delete")
        .json()
        .await
        .expect("json");
    assert_eq!(deleted, json!({ "success": true }));

    let listed: Vec<Product> = http
        .get(format!("{}/products", base))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("json");
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().all(|p| p.id != mug.id));

    let missing = http
        .get(format!("{}/products/{}", base, mug.id))
        .send()
        .await
        .expect("get");
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn errors_carry_a_detail() {
    let (db, products) = stocked_store().await;
    let base = spawn(store_router(db)).await;
    let http = reqwest::Client::new();

    let missing = http
        .get(format!("{}/orders/{}", base, uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("request");
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    let body: ErrorResponse = missing.json().await.expect("json");
    assert_eq!(body.detail, "Order not found");

    let bad_id = http
        .get(format!("{}/products/not-a-uuid", base))
        .send()
        .await
        .expect("request");
    assert_eq!(bad_id.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let zero = http
        .post(format!("{}/cart", base))
        .json(&json!({ "product_id": products[0].id, "quantity": 0 }))
        .send()
        .await
        .expect("request");
    assert_eq!(zero.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let empty_order = http
        .post(format!("{}/orders", base))
        .json(&json!({ "cart_item_ids": [] }))
        .send()
        .await
        .expect("request");
    assert_eq!(empty_order.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let unknown_item = http
        .delete(format!("{}/cart/{}", base, uuid::Uuid::new_v4()))
        .send()
        .await
        .expect("request");
    assert_eq!(unknown_item.status(), reqwest::StatusCode::NOT_FOUND);
}
