use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
};

use crate::auth::CurrentUser;
use crate::server::AppState;
use crate::server::dto::{AddCartLineRequest, RemovedResponse, SetCartQuantityRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::validate_add_quantity;

pub fn cart_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cart", get(get_cart))
        .route("/cart", post(add_to_cart))
        .route("/cart", put(set_quantity))
        .route("/cart", delete(clear_cart))
        .route("/cart/count", get(count_cart))
        .route("/cart/{product_id}", delete(remove_from_cart))
}

async fn get_cart(auth: CurrentUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let lines = state
        .store
        .list_cart_lines(&auth.user.id)
        .api_err("Failed to load cart")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(lines)))
}

async fn add_to_cart(
    auth: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddCartLineRequest>,
) -> impl IntoResponse {
    validate_add_quantity(req.quantity)?;

    let line = state
        .store
        .add_cart_line(&auth.user.id, &req.product_id, req.quantity)
        .api_err("Failed to add to cart")?
        .ok_or_else(|| ApiError::bad_request("Unknown product"))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(line)))
}

async fn set_quantity(
    auth: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetCartQuantityRequest>,
) -> impl IntoResponse {
    let line = state
        .store
        .set_cart_quantity(&auth.user.id, &req.product_id, req.quantity)
        .api_err("Failed to update cart")?;

    // Zero or below removed the line; data is null in that case. A missing
    // line with a positive quantity is the caller's mistake.
    if line.is_none() && req.quantity > 0 {
        return Err(ApiError::bad_request("Product is not in the cart"));
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(line)))
}

async fn remove_from_cart(
    auth: CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> impl IntoResponse {
    let removed = state
        .store
        .remove_cart_line(&auth.user.id, &product_id)
        .api_err("Failed to remove from cart")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(RemovedResponse { removed })))
}

async fn clear_cart(auth: CurrentUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let removed = state
        .store
        .clear_cart(&auth.user.id)
        .api_err("Failed to clear cart")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(RemovedResponse { removed })))
}

async fn count_cart(auth: CurrentUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let count = state
        .store
        .count_cart_lines(&auth.user.id)
        .api_err("Failed to count cart lines")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        serde_json::json!({ "count": count }),
    )))
}
