//! Mock catalog generation.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{Database, NewProduct, StoreResult};

const ADJECTIVES: &[&str] = &[
    "Pro", "Ultra", "Smart", "Mini", "Classic", "Premium", "Elite", "Basic", "Advanced",
    "Legendary",
];

const PRODUCT_BASES: &[(&str, &str)] = &[
    ("Phone", "Electronics"),
    ("Laptop", "Electronics"),
    ("Headphones", "Electronics"),
    ("Monitor", "Electronics"),
    ("Keyboard", "Electronics"),
    ("Mouse", "Electronics"),
    ("Smartwatch", "Electronics"),
    ("Camera", "Electronics"),
    ("Speaker", "Electronics"),
    ("Tablet", "Electronics"),
    ("Coffee Maker", "Home & Kitchen"),
    ("Blender", "Home & Kitchen"),
    ("Toaster", "Home & Kitchen"),
    ("Air Fryer", "Home & Kitchen"),
    ("Vacuum Cleaner", "Home & Kitchen"),
    ("Rice Cooker", "Home & Kitchen"),
    ("Kettle", "Home & Kitchen"),
    ("Lamp", "Home & Kitchen"),
    ("Stand Mixer", "Home & Kitchen"),
    ("Microwave", "Home & Kitchen"),
    ("Yoga Mat", "Sports"),
    ("Dumbbell Set", "Sports"),
    ("Treadmill", "Sports"),
    ("Bicycle", "Sports"),
    ("Tennis Racket", "Sports"),
    ("Basketball", "Sports"),
    ("Soccer Ball", "Sports"),
    ("Gym Bag", "Sports"),
    ("Protein Shaker", "Sports"),
    ("Jump Rope", "Sports"),
    ("Novel", "Books"),
    ("Cookbook", "Books"),
    ("Textbook", "Books"),
    ("Biography", "Books"),
    ("Comic Book", "Books"),
    ("Dictionary", "Books"),
    ("Poetry Book", "Books"),
    ("Art Book", "Books"),
    ("Journal", "Books"),
    ("Travel Guide", "Books"),
    ("T-Shirt", "Clothing"),
    ("Jeans", "Clothing"),
    ("Jacket", "Clothing"),
    ("Sweater", "Clothing"),
    ("Shoes", "Clothing"),
    ("Hat", "Clothing"),
    ("Socks", "Clothing"),
    ("Dress", "Clothing"),
    ("Scarf", "Clothing"),
    ("Belt", "Clothing"),
    ("Face Cream", "Beauty"),
    ("Shampoo", "Beauty"),
    ("Lipstick", "Beauty"),
    ("Perfume", "Beauty"),
    ("Serum", "Beauty"),
    ("Sunscreen", "Beauty"),
    ("Oil Filter", "Automotive"),
    ("Wiper Blades", "Automotive"),
    ("Car Battery", "Automotive"),
    ("Floor Mats", "Automotive"),
];

/// Image search keywords per category.
fn image_keywords(category: &str) -> &'static [&'static str] {
    match category {
        "Electronics" => &["electronics", "gadgets", "tech"],
        "Home & Kitchen" => &["kitchen", "home appliances", "interior"],
        "Books" => &["books", "reading", "library"],
        "Clothing" => &["clothes", "fashion", "apparel"],
        "Sports" => &["sports", "fitness", "gym"],
        "Beauty" => &["beauty", "cosmetics", "skincare"],
        "Automotive" => &["car", "automotive", "vehicle"],
        _ => &["product"],
    }
}

/// Build one random product.
pub fn random_product<R: Rng + ?Sized>(rng: &mut R) -> NewProduct {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Classic");
    let (base, category) = PRODUCT_BASES
        .choose(rng)
        .copied()
        .unwrap_or(("Journal", "Books"));
    let name = format!("{} {} {}", adjective, base, rng.gen_range(100..=999));
    let keyword = image_keywords(category)
        .choose(rng)
        .copied()
        .unwrap_or("product");

    let description = format!(
        "Experience the ultimate {} with the {}. This {} essential features {} technology and premium materials.",
        base.to_lowercase(),
        name,
        category.to_lowercase(),
        adjective.to_lowercase()
    );
    // One decimal place, 3.5..=5.0
    let rating = rng.gen_range(35..=50) as f32 / 10.0;

    NewProduct {
        name,
        description,
        price: rng.gen_range(500..=150_000),
        stock_quantity: rng.gen_range(0..=100),
        category: category.to_string(),
        image_url: format!("https://loremflickr.com/600/600/{}", keyword.replace(' ', "%20")),
        rating: Some(rating),
        review_count: Some(rng.gen_range(10..=5000)),
    }
}

/// Fill the store with `count` random products.
pub async fn seed_catalog<R: Rng + ?Sized>(
    db: &Database,
    count: usize,
    rng: &mut R,
) -> StoreResult<usize> {
    let products: Vec<NewProduct> = (0..count).map(|_| random_product(rng)).collect();
    for product in products {
        db.create_product(product).await?;
    }
    tracing::info!("Seeded {} mock products", count);
    Ok(count)
}
