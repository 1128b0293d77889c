use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
};

use crate::auth::CurrentUser;
use crate::server::AppState;
use crate::server::dto::{AddWishlistLineRequest, RemovedResponse, WishlistContainsResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

pub fn wishlist_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wishlist", get(get_wishlist))
        .route("/wishlist", post(add_to_wishlist))
        .route("/wishlist/{product_id}", get(contains))
        .route("/wishlist/{product_id}", delete(remove_from_wishlist))
}

async fn get_wishlist(auth: CurrentUser, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let lines = state
        .store
        .list_wishlist_lines(&auth.user.id)
        .api_err("Failed to load wishlist")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(lines)))
}

async fn add_to_wishlist(
    auth: CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddWishlistLineRequest>,
) -> impl IntoResponse {
    let line = state
        .store
        .add_wishlist_line(&auth.user.id, &req.product_id)
        .api_err("Failed to add to wishlist")?
        .ok_or_else(|| ApiError::bad_request("Unknown product"))?;

    Ok::<_, ApiError>(Json(ApiResponse::success(line)))
}

async fn contains(
    auth: CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> impl IntoResponse {
    let contains = state
        .store
        .wishlist_contains(&auth.user.id, &product_id)
        .api_err("Failed to check wishlist")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(WishlistContainsResponse {
        contains,
    })))
}

async fn remove_from_wishlist(
    auth: CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> impl IntoResponse {
    let removed = state
        .store
        .remove_wishlist_line(&auth.user.id, &product_id)
        .api_err("Failed to remove from wishlist")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(RemovedResponse { removed })))
}
