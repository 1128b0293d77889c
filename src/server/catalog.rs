use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};

use crate::server::AppState;
use crate::server::dto::ListProductsParams;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};

const DEFAULT_FEATURED_LIMIT: i64 = 8;

pub fn catalog_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListProductsParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let products = if params.featured.unwrap_or(false) {
        let limit = params.limit.unwrap_or(DEFAULT_FEATURED_LIMIT);
        if limit < 1 {
            return Err(ApiError::bad_request("Limit must be at least 1"));
        }
        store
            .list_featured_products(limit)
            .api_err("Failed to list products")?
    } else if let Some(ref category) = params.category {
        store
            .list_products_by_category(category)
            .api_err("Failed to list products")?
    } else {
        store.list_products().api_err("Failed to list products")?
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(products)))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let product = state
        .store
        .get_product(&id)
        .api_err("Failed to get product")?
        .or_not_found("Product not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(product)))
}
