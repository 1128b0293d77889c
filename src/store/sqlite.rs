use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_price(s: &str) -> Decimal {
    s.parse().unwrap_or_else(|e| {
        tracing::error!("Invalid price in database: '{}' - {}", s, e);
        Decimal::ZERO
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: parse_price(&row.get::<_, String>(3)?),
        image_url: row.get(4)?,
        category: row.get(5)?,
        stock: row.get(6)?,
        featured: row.get(7)?,
        created_at: parse_datetime(&row.get::<_, String>(8)?),
        updated_at: parse_datetime(&row.get::<_, String>(9)?),
    })
}

/// Reads an optional joined product starting at `offset`. The LEFT JOIN
/// leaves every product column NULL when the referenced row is gone.
fn joined_product_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Option<Product>> {
    let id: Option<String> = row.get(offset)?;
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(Some(Product {
        id,
        name: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        price: parse_price(&row.get::<_, String>(offset + 3)?),
        image_url: row.get(offset + 4)?,
        category: row.get(offset + 5)?,
        stock: row.get(offset + 6)?,
        featured: row.get(offset + 7)?,
        created_at: parse_datetime(&row.get::<_, String>(offset + 8)?),
        updated_at: parse_datetime(&row.get::<_, String>(offset + 9)?),
    }))
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image_url, category, stock, featured, created_at, updated_at";

const CART_LINE_SELECT: &str = "SELECT c.id, c.user_id, c.product_id, c.quantity, c.created_at, c.updated_at,
        p.id, p.name, p.description, p.price, p.image_url, p.category, p.stock, p.featured, p.created_at, p.updated_at
 FROM cart c LEFT JOIN products p ON p.id = c.product_id";

const WISHLIST_LINE_SELECT: &str = "SELECT w.id, w.user_id, w.product_id, w.created_at,
        p.id, p.name, p.description, p.price, p.image_url, p.category, p.stock, p.featured, p.created_at, p.updated_at
 FROM wishlist w LEFT JOIN products p ON p.id = w.product_id";

fn cart_line_from_row(row: &Row<'_>) -> rusqlite::Result<CartLine> {
    Ok(CartLine {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        quantity: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
        product: joined_product_from_row(row, 6)?,
    })
}

fn wishlist_line_from_row(row: &Row<'_>) -> rusqlite::Result<WishlistLine> {
    Ok(WishlistLine {
        id: row.get(0)?,
        user_id: row.get(1)?,
        product_id: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
        product: joined_product_from_row(row, 4)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, name, email, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.name,
                user.email,
                user.password_hash,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, email, password_hash, created_at, updated_at
             FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, email, password_hash, created_at, updated_at
             FROM users WHERE email = ?1",
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    // Product operations

    fn create_product(&self, product: &Product) -> Result<bool> {
        // Keyed on the unique product name so repeated seeding is a no-op.
        let rows = self.conn().execute(
            "INSERT OR IGNORE INTO products (id, name, description, price, image_url, category, stock, featured, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                product.id,
                product.name,
                product.description,
                product.price.to_string(),
                product.image_url,
                product.category,
                product.stock,
                product.featured,
                format_datetime(&product.created_at),
                format_datetime(&product.updated_at),
            ],
        )?;
        Ok(rows > 0)
    }

    fn get_product(&self, id: &str) -> Result<Option<Product>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
            params![id],
            product_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_products(&self) -> Result<Vec<Product>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT {PRODUCT_COLUMNS} FROM products"))?;

        let rows = stmt.query_map([], product_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_featured_products(&self, limit: i64) -> Result<Vec<Product>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE featured = 1 LIMIT ?1"
        ))?;

        let rows = stmt.query_map(params![limit], product_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_products_by_category(&self, category: &str) -> Result<Vec<Product>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category = ?1"
        ))?;

        let rows = stmt.query_map(params![category], product_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_products(&self) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count)
    }

    // Cart operations

    fn list_cart_lines(&self, user_id: &str) -> Result<Vec<CartLine>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{CART_LINE_SELECT} WHERE c.user_id = ?1 ORDER BY c.created_at"
        ))?;

        let rows = stmt.query_map(params![user_id], cart_line_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn add_cart_line(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Option<CartLine>> {
        if self.get_product(product_id)?.is_none() {
            return Ok(None);
        }

        let now = format_datetime(&Utc::now());
        let conn = self.conn();

        // Single atomic upsert: a concurrent add for the same (user, product)
        // pair folds into the existing row instead of losing an update.
        conn.execute(
            "INSERT INTO cart (id, user_id, product_id, quantity, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (user_id, product_id) DO UPDATE SET
                quantity = quantity + excluded.quantity,
                updated_at = excluded.updated_at",
            params![Uuid::new_v4().to_string(), user_id, product_id, quantity, now],
        )?;

        conn.query_row(
            &format!("{CART_LINE_SELECT} WHERE c.user_id = ?1 AND c.product_id = ?2"),
            params![user_id, product_id],
            cart_line_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn set_cart_quantity(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<Option<CartLine>> {
        // Zero or negative is the removal path, not an error.
        if quantity <= 0 {
            self.remove_cart_line(user_id, product_id)?;
            return Ok(None);
        }

        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE cart SET quantity = ?3, updated_at = ?4
             WHERE user_id = ?1 AND product_id = ?2",
            params![
                user_id,
                product_id,
                quantity,
                format_datetime(&Utc::now())
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }

        conn.query_row(
            &format!("{CART_LINE_SELECT} WHERE c.user_id = ?1 AND c.product_id = ?2"),
            params![user_id, product_id],
            cart_line_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn remove_cart_line(&self, user_id: &str, product_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM cart WHERE user_id = ?1 AND product_id = ?2",
            params![user_id, product_id],
        )?;
        Ok(rows > 0)
    }

    fn clear_cart(&self, user_id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM cart WHERE user_id = ?1", params![user_id])?;
        Ok(rows > 0)
    }

    fn count_cart_lines(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cart WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // Wishlist operations

    fn list_wishlist_lines(&self, user_id: &str) -> Result<Vec<WishlistLine>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "{WISHLIST_LINE_SELECT} WHERE w.user_id = ?1 ORDER BY w.created_at"
        ))?;

        let rows = stmt.query_map(params![user_id], wishlist_line_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn add_wishlist_line(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> Result<Option<WishlistLine>> {
        if self.get_product(product_id)?.is_none() {
            return Ok(None);
        }

        let conn = self.conn();

        // Idempotent: an existing (user, product) row wins and is returned
        // unchanged.
        conn.execute(
            "INSERT OR IGNORE INTO wishlist (id, user_id, product_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                Uuid::new_v4().to_string(),
                user_id,
                product_id,
                format_datetime(&Utc::now())
            ],
        )?;

        conn.query_row(
            &format!("{WISHLIST_LINE_SELECT} WHERE w.user_id = ?1 AND w.product_id = ?2"),
            params![user_id, product_id],
            wishlist_line_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn remove_wishlist_line(&self, user_id: &str, product_id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM wishlist WHERE user_id = ?1 AND product_id = ?2",
            params![user_id, product_id],
        )?;
        Ok(rows > 0)
    }

    fn wishlist_contains(&self, user_id: &str, product_id: &str) -> Result<bool> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM wishlist WHERE user_id = ?1 AND product_id = ?2",
            params![user_id, product_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Session operations

    fn create_session(&self, session: &Session) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO sessions (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.token_hash,
                session.token_lookup,
                session.user_id,
                format_datetime(&session.created_at),
                format_datetime(&session.expires_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::SessionLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at
             FROM sessions WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    expires_at: parse_datetime(&row.get::<_, String>(5)?),
                    last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn delete_expired_sessions(&self) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![format_datetime(&Utc::now())],
        )?;
        Ok(rows)
    }

    fn update_session_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE sessions SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn sample_user(id: &str, email: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn sample_product(id: &str, name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: name.to_string(),
            description: "A product".to_string(),
            price: Decimal::new(4990, 2),
            image_url: format!("/products/{id}.jpg"),
            category: "casual".to_string(),
            stock: 10,
            featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let (_temp, store) = test_store();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"products".to_string()));
        assert!(tables.contains(&"cart".to_string()));
        assert!(tables.contains(&"wishlist".to_string()));
        assert!(tables.contains(&"sessions".to_string()));
    }

    #[test]
    fn test_user_email_unique() {
        let (_temp, store) = test_store();

        store.create_user(&sample_user("u1", "a@example.com")).unwrap();

        let result = store.create_user(&sample_user("u2", "a@example.com"));
        assert!(matches!(result, Err(Error::AlreadyExists)));

        let fetched = store.get_user_by_email("a@example.com").unwrap().unwrap();
        assert_eq!(fetched.id, "u1");
        assert_eq!(fetched.password_hash, "$argon2id$stub");
    }

    #[test]
    fn test_product_queries() {
        let (_temp, store) = test_store();

        let mut featured = sample_product("p1", "Shirt One");
        featured.featured = true;
        featured.category = "formal".to_string();
        store.create_product(&featured).unwrap();
        store.create_product(&sample_product("p2", "Shirt Two")).unwrap();

        assert_eq!(store.count_products().unwrap(), 2);
        assert_eq!(store.list_products().unwrap().len(), 2);
        assert_eq!(store.list_products_by_category("formal").unwrap().len(), 1);

        let featured_rows = store.list_featured_products(8).unwrap();
        assert_eq!(featured_rows.len(), 1);
        assert_eq!(featured_rows[0].id, "p1");

        let fetched = store.get_product("p1").unwrap().unwrap();
        assert_eq!(fetched.price, Decimal::new(4990, 2));
    }

    #[test]
    fn test_create_product_ignores_duplicate_name() {
        let (_temp, store) = test_store();

        assert!(store.create_product(&sample_product("p1", "Shirt")).unwrap());
        assert!(!store.create_product(&sample_product("p2", "Shirt")).unwrap());
        assert_eq!(store.count_products().unwrap(), 1);
    }

    #[test]
    fn test_cart_add_twice_sums_quantity() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        let first = store.add_cart_line("u1", "p1", 2).unwrap().unwrap();
        assert_eq!(first.quantity, 2);

        let second = store.add_cart_line("u1", "p1", 3).unwrap().unwrap();
        assert_eq!(second.quantity, 5);
        assert_eq!(second.id, first.id);

        let lines = store.list_cart_lines("u1").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
    }

    #[test]
    fn test_cart_add_unknown_product() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();

        let line = store.add_cart_line("u1", "missing", 1).unwrap();
        assert!(line.is_none());
    }

    #[test]
    fn test_cart_line_joins_product() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        store.add_cart_line("u1", "p1", 1).unwrap();

        let lines = store.list_cart_lines("u1").unwrap();
        let joined = lines[0].product.as_ref().unwrap();
        let catalog = store.get_product("p1").unwrap().unwrap();
        assert_eq!(joined.name, catalog.name);
        assert_eq!(joined.price, catalog.price);
        assert_eq!(joined.stock, catalog.stock);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        store.add_cart_line("u1", "p1", 2).unwrap();

        let result = store.set_cart_quantity("u1", "p1", 0).unwrap();
        assert!(result.is_none());
        assert!(store.list_cart_lines("u1").unwrap().is_empty());
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        store.add_cart_line("u1", "p1", 2).unwrap();

        let line = store.set_cart_quantity("u1", "p1", 7).unwrap().unwrap();
        assert_eq!(line.quantity, 7);
    }

    #[test]
    fn test_set_quantity_absent_line_is_noop() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        let result = store.set_cart_quantity("u1", "p1", 3).unwrap();
        assert!(result.is_none());
        assert!(store.list_cart_lines("u1").unwrap().is_empty());
    }

    #[test]
    fn test_cart_remove_reports_deletion() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        store.add_cart_line("u1", "p1", 1).unwrap();

        assert!(store.remove_cart_line("u1", "p1").unwrap());
        assert!(!store.remove_cart_line("u1", "p1").unwrap());
    }

    #[test]
    fn test_clear_cart_scoped_to_user() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_user(&sample_user("u2", "b@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();
        store.create_product(&sample_product("p2", "Polo")).unwrap();

        store.add_cart_line("u1", "p1", 1).unwrap();
        store.add_cart_line("u1", "p2", 1).unwrap();
        store.add_cart_line("u2", "p1", 4).unwrap();

        assert!(store.clear_cart("u1").unwrap());
        assert!(store.list_cart_lines("u1").unwrap().is_empty());
        assert!(!store.clear_cart("u1").unwrap());

        let other = store.list_cart_lines("u2").unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].quantity, 4);
    }

    #[test]
    fn test_count_cart_lines() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();
        store.create_product(&sample_product("p2", "Polo")).unwrap();

        store.add_cart_line("u1", "p1", 3).unwrap();
        store.add_cart_line("u1", "p2", 1).unwrap();

        // Counts lines, not units.
        assert_eq!(store.count_cart_lines("u1").unwrap(), 2);
    }

    #[test]
    fn test_wishlist_add_idempotent() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        let first = store.add_wishlist_line("u1", "p1").unwrap().unwrap();
        let second = store.add_wishlist_line("u1", "p1").unwrap().unwrap();
        assert_eq!(first.id, second.id);

        assert_eq!(store.list_wishlist_lines("u1").unwrap().len(), 1);
    }

    #[test]
    fn test_wishlist_add_unknown_product() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();

        assert!(store.add_wishlist_line("u1", "missing").unwrap().is_none());
    }

    #[test]
    fn test_wishlist_contains_and_remove() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        assert!(!store.wishlist_contains("u1", "p1").unwrap());

        store.add_wishlist_line("u1", "p1").unwrap();
        assert!(store.wishlist_contains("u1", "p1").unwrap());

        assert!(store.remove_wishlist_line("u1", "p1").unwrap());
        assert!(!store.remove_wishlist_line("u1", "p1").unwrap());
        assert!(!store.wishlist_contains("u1", "p1").unwrap());
    }

    fn sample_session(id: &str, lookup: &str, user_id: &str, expires_at: DateTime<Utc>) -> Session {
        Session {
            id: id.to_string(),
            token_hash: "hash".to_string(),
            token_lookup: lookup.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            expires_at,
            last_used_at: None,
        }
    }

    #[test]
    fn test_session_lookup_collision() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();

        let expires = Utc::now() + Duration::days(7);
        store
            .create_session(&sample_session("s1", "lookup12", "u1", expires))
            .unwrap();

        let result = store.create_session(&sample_session("s2", "lookup12", "u1", expires));
        assert!(matches!(result, Err(Error::SessionLookupCollision)));
    }

    #[test]
    fn test_delete_expired_sessions() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();

        store
            .create_session(&sample_session(
                "s1",
                "lookup01",
                "u1",
                Utc::now() - Duration::hours(1),
            ))
            .unwrap();
        store
            .create_session(&sample_session(
                "s2",
                "lookup02",
                "u1",
                Utc::now() + Duration::days(7),
            ))
            .unwrap();

        assert_eq!(store.delete_expired_sessions().unwrap(), 1);
        assert!(store.get_session_by_lookup("lookup01").unwrap().is_none());
        assert!(store.get_session_by_lookup("lookup02").unwrap().is_some());
    }

    #[test]
    fn test_cascade_delete_user_drops_lines() {
        let (_temp, store) = test_store();
        store.create_user(&sample_user("u1", "a@example.com")).unwrap();
        store.create_product(&sample_product("p1", "Shirt")).unwrap();

        store.add_cart_line("u1", "p1", 1).unwrap();
        store.add_wishlist_line("u1", "p1").unwrap();

        store
            .conn()
            .execute("DELETE FROM users WHERE id = 'u1'", [])
            .unwrap();

        assert!(store.list_cart_lines("u1").unwrap().is_empty());
        assert!(store.list_wishlist_lines("u1").unwrap().is_empty());
    }
}
