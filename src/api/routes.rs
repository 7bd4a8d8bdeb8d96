//! Store API routes.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::{parse_id, ApiError};
use super::types::{
    AddToCartRequest, CreateOrderRequest, HealthResponse, PaymentConfirmRequest,
    PaymentConfirmResponse, PaymentIntentRequest, SuccessResponse, UpdateQuantityQuery,
};
use crate::store::{CartLine, Database, NewProduct, Order, Payment, Product, SearchQuery};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Permissive CORS; the storefront frontend is served from another origin.
pub(crate) fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn store_router(db: Database) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/products", get(list_products).post(create_product))
        .route("/products/search", get(search_products))
        .route("/products/categories", get(list_categories))
        .route("/products/:id", get(get_product).delete(delete_product))
        .route("/cart", get(get_cart).post(add_to_cart))
        .route("/cart/:id", put(update_cart_item).delete(remove_cart_item))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/payments/create-intent", post(create_payment_intent))
        .route("/payments/confirm", post(confirm_payment))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

// Products

async fn create_product(
    State(db): State<Database>,
    Json(new): Json<NewProduct>,
) -> ApiResult<Product> {
    Ok(Json(db.create_product(new).await?))
}

async fn list_products(State(db): State<Database>) -> Json<Vec<Product>> {
    Json(db.list_products().await)
}

async fn search_products(
    State(db): State<Database>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<Product>> {
    tracing::debug!(?query, "Product search");
    Json(db.search_products(&query).await)
}

async fn list_categories(State(db): State<Database>) -> Json<Vec<String>> {
    Json(db.list_categories().await)
}

async fn get_product(State(db): State<Database>, Path(id): Path<String>) -> ApiResult<Product> {
    Ok(Json(db.get_product(parse_id(&id)?).await?))
}

async fn delete_product(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<SuccessResponse> {
    db.deactivate_product(parse_id(&id)?).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// Cart

async fn get_cart(State(db): State<Database>) -> Json<Vec<CartLine>> {
    Json(db.get_cart().await)
}

async fn add_to_cart(
    State(db): State<Database>,
    Json(req): Json<AddToCartRequest>,
) -> ApiResult<CartLine> {
    Ok(Json(db.add_to_cart(req.product_id, req.quantity).await?))
}

async fn update_cart_item(
    State(db): State<Database>,
    Path(id): Path<String>,
    Query(query): Query<UpdateQuantityQuery>,
) -> ApiResult<CartLine> {
    Ok(Json(
        db.update_cart_item(parse_id(&id)?, query.quantity).await?,
    ))
}

async fn remove_cart_item(
    State(db): State<Database>,
    Path(id): Path<String>,
) -> ApiResult<SuccessResponse> {
    db.remove_cart_item(parse_id(&id)?).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// Orders

async fn create_order(
    State(db): State<Database>,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<Order> {
    let order = db.create_order(&req.cart_item_ids).await?;
    tracing::info!(order_id = %order.id, total = order.total_amount, "Order created");
    Ok(Json(order))
}

async fn list_orders(State(db): State<Database>) -> Json<Vec<Order>> {
    Json(db.list_orders().await)
}

async fn get_order(State(db): State<Database>, Path(id): Path<String>) -> ApiResult<Order> {
    Ok(Json(db.get_order(parse_id(&id)?).await?))
}

// Payments

async fn create_payment_intent(
    State(db): State<Database>,
    Json(req): Json<PaymentIntentRequest>,
) -> ApiResult<Payment> {
    Ok(Json(db.create_payment_intent(req.order_id).await?))
}

async fn confirm_payment(
    State(db): State<Database>,
    Json(req): Json<PaymentConfirmRequest>,
) -> ApiResult<PaymentConfirmResponse> {
    let order_id = db.confirm_payment(req.payment_id).await?;
    tracing::info!(payment_id = %req.payment_id, %order_id, "Payment confirmed");
    Ok(Json(PaymentConfirmResponse {
        success: true,
        order_id,
    }))
}
