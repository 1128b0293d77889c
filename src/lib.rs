//! # Zarco
//!
//! A storefront server, usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! zarco = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use zarco::server::{AppState, create_router};
//! use zarco::store::{SqliteStore, Store, seed};
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/zarco.db")).unwrap();
//! store.initialize().unwrap();
//! seed::seed_catalog(&store).unwrap();
//!
//! let state = Arc::new(AppState {
//!     store: Arc::new(store),
//!     secure_cookies: false,
//! });
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the binary's CLI. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
