//! Helpers shared by the integration tests.

#![allow(dead_code)]

use axum::Router;
use storefront::store::{Database, NewProduct, Product};
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

pub fn new_product(name: &str, category: &str, price: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: format!("A {} for testing", name.to_lowercase()),
        price,
        stock_quantity: 10,
        category: category.to_string(),
        image_url: "https://loremflickr.com/600/600/test".to_string(),
        rating: None,
        review_count: None,
    }
}

/// A store with a small fixed catalog.
pub async fn stocked_store() -> (Database, Vec<Product>) {
    let db = Database::new();
    let mut products = Vec::new();
    for (name, category, price) in [
        ("Classic Football", "Sports", 2_999),
        ("Trail Running Shoes", "Sports", 8_950),
        ("Smart Watch", "Electronics", 19_900),
        ("Ceramic Coffee Mug", "Home", 1_250),
    ] {
        products.push(
            db.create_product(new_product(name, category, price))
                .await
                .expect("create product"),
        );
    }
    (db, products)
}
