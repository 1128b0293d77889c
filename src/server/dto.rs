use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub limit: Option<i64>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddCartLineRequest {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetCartQuantityRequest {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct AddWishlistLineRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct WishlistContainsResponse {
    pub contains: bool,
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: bool,
}
