use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::Store;
use crate::error::Result;
use crate::types::Product;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    /// Price in cents.
    price_cents: i64,
    image_url: &'static str,
    category: &'static str,
    stock: i64,
    featured: bool,
}

const DEMO_CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Basic White Shirt",
        description: "Basic cotton shirt in white, ideal for everyday wear.",
        price_cents: 6990,
        image_url: "/products/basic-white-shirt.jpg",
        category: "basic",
        stock: 100,
        featured: true,
    },
    SeedProduct {
        name: "Black Polo Shirt",
        description: "Polo shirt in black, perfect for casual or semi-formal occasions.",
        price_cents: 8990,
        image_url: "/products/black-polo-shirt.jpg",
        category: "polo",
        stock: 80,
        featured: true,
    },
    SeedProduct {
        name: "Slim Dress Shirt",
        description: "Slim-cut dress shirt in fine cotton, ideal for the office.",
        price_cents: 12990,
        image_url: "/products/slim-dress-shirt.jpg",
        category: "formal",
        stock: 50,
        featured: true,
    },
    SeedProduct {
        name: "Tropical Print Shirt",
        description: "Shirt with a tropical print, made for laid-back occasions.",
        price_cents: 9990,
        image_url: "/products/tropical-print-shirt.jpg",
        category: "casual",
        stock: 60,
        featured: true,
    },
    SeedProduct {
        name: "Denim Shirt",
        description: "Lightweight denim shirt for a modern, relaxed look.",
        price_cents: 11990,
        image_url: "/products/denim-shirt.jpg",
        category: "casual",
        stock: 45,
        featured: false,
    },
    SeedProduct {
        name: "Beige Linen Shirt",
        description: "Linen shirt in beige, fresh and elegant for warm days.",
        price_cents: 14990,
        image_url: "/products/beige-linen-shirt.jpg",
        category: "casual",
        stock: 40,
        featured: true,
    },
    SeedProduct {
        name: "Red Plaid Shirt",
        description: "Plaid shirt in red and black, classic and versatile.",
        price_cents: 10990,
        image_url: "/products/red-plaid-shirt.jpg",
        category: "casual",
        stock: 55,
        featured: false,
    },
    SeedProduct {
        name: "Grey Henley Shirt",
        description: "Henley-style shirt in grey, casual and modern.",
        price_cents: 7990,
        image_url: "/products/grey-henley-shirt.jpg",
        category: "casual",
        stock: 60,
        featured: false,
    },
    SeedProduct {
        name: "Blue Oxford Shirt",
        description: "Classic blue oxford shirt, versatile across occasions.",
        price_cents: 11990,
        image_url: "/products/blue-oxford-shirt.jpg",
        category: "formal",
        stock: 70,
        featured: true,
    },
    SeedProduct {
        name: "Green Flannel Shirt",
        description: "Flannel shirt in green, warm and comfortable.",
        price_cents: 9990,
        image_url: "/products/green-flannel-shirt.jpg",
        category: "casual",
        stock: 50,
        featured: false,
    },
    SeedProduct {
        name: "Basic Black Shirt",
        description: "Basic cotton shirt in black, an essential for any wardrobe.",
        price_cents: 6990,
        image_url: "/products/basic-black-shirt.jpg",
        category: "basic",
        stock: 90,
        featured: true,
    },
    SeedProduct {
        name: "Striped Short Sleeve Shirt",
        description: "Short-sleeved striped shirt, ideal for hot days.",
        price_cents: 7990,
        image_url: "/products/striped-short-sleeve-shirt.jpg",
        category: "casual",
        stock: 65,
        featured: false,
    },
];

/// Populates the demo catalog. Inserts are keyed on the unique product name,
/// so running this any number of times (or from several processes) leaves
/// exactly one row per demo product. Returns how many rows were new.
pub fn seed_catalog(store: &dyn Store) -> Result<usize> {
    let mut inserted = 0;

    for seed in DEMO_CATALOG {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            price: Decimal::new(seed.price_cents, 2),
            image_url: seed.image_url.to_string(),
            category: seed.category.to_string(),
            stock: seed.stock,
            featured: seed.featured,
            created_at: now,
            updated_at: now,
        };

        if store.create_product(&product)? {
            inserted += 1;
        }
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use tempfile::TempDir;

    #[test]
    fn test_seed_catalog_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let first = seed_catalog(&store).unwrap();
        assert_eq!(first, DEMO_CATALOG.len());

        let second = seed_catalog(&store).unwrap();
        assert_eq!(second, 0);

        assert_eq!(store.count_products().unwrap() as usize, DEMO_CATALOG.len());
    }

    #[test]
    fn test_seed_catalog_featured_subset() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        seed_catalog(&store).unwrap();

        let featured = store.list_featured_products(8).unwrap();
        assert!(!featured.is_empty());
        assert!(featured.len() <= 8);
        assert!(featured.iter().all(|p| p.featured));
    }
}
