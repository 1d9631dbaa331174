use axum::{
    extract::{Path, State},
    Extension, Json,
};
use storefront_core::{query, CategoryCount, Product};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

/// GET /api/v1/categories: category index with product counts.
pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<CategoryCount>>> {
    let catalog = state.snapshot().await;

    Json(ApiResponse {
        data: query::category_counts(catalog.products()),
        meta: ResponseMeta::new(req_id.0),
    })
}

/// GET /api/v1/categories/{name}/products: one category page.
///
/// An unknown category is an empty page, not a 404.
pub(super) async fn list_category_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Json<ApiResponse<Vec<Product>>> {
    let catalog = state.snapshot().await;
    let data = catalog.by_category(&name).into_iter().cloned().collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
