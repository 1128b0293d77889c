mod schema;
pub mod seed;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, id: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // Product operations
    fn create_product(&self, product: &Product) -> Result<bool>;
    fn get_product(&self, id: &str) -> Result<Option<Product>>;
    fn list_products(&self) -> Result<Vec<Product>>;
    fn list_featured_products(&self, limit: i64) -> Result<Vec<Product>>;
    fn list_products_by_category(&self, category: &str) -> Result<Vec<Product>>;
    fn count_products(&self) -> Result<i64>;

    // Cart operations
    fn list_cart_lines(&self, user_id: &str) -> Result<Vec<CartLine>>;
    fn add_cart_line(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Option<CartLine>>;
    fn set_cart_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Option<CartLine>>;
    fn remove_cart_line(&self, user_id: &str, product_id: &str) -> Result<bool>;
    fn clear_cart(&self, user_id: &str) -> Result<bool>;
    fn count_cart_lines(&self, user_id: &str) -> Result<i64>;

    // Wishlist operations
    fn list_wishlist_lines(&self, user_id: &str) -> Result<Vec<WishlistLine>>;
    fn add_wishlist_line(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Option<WishlistLine>>;
    fn remove_wishlist_line(&self, user_id: &str, product_id: &str) -> Result<bool>;
    fn wishlist_contains(&self, user_id: &str, product_id: &str) -> Result<bool>;

    // Session operations
    fn create_session(&self, session: &Session) -> Result<()>;
    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>>;
    fn delete_session(&self, id: &str) -> Result<bool>;
    fn delete_expired_sessions(&self) -> Result<usize>;
    fn update_session_last_used(&self, id: &str) -> Result<()>;

    fn close(&self) -> Result<()>;
}
