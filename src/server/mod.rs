mod auth;
mod cart;
mod catalog;
pub mod dto;
pub mod response;
mod router;
pub mod validation;
mod wishlist;

pub use router::{AppState, create_router};
