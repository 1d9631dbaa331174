//! Admin catalog handlers: list, create, update, delete.
//!
//! Every write derives a new snapshot from the current one; readers already
//! holding the previous snapshot keep seeing it until their request ends.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use storefront_core::{Product, ProductDraft};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_catalog_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct DeleteProductResponse {
    id: String,
    deleted: bool,
}

fn stored_product(
    catalog: &storefront_core::Catalog,
    id: &str,
    req_id: &str,
) -> Result<Product, ApiError> {
    catalog.get(id).cloned().ok_or_else(|| {
        tracing::error!(product_id = %id, "product missing from freshly written snapshot");
        ApiError::new(req_id, "internal_error", "catalog update was not applied")
    })
}

/// GET /api/v1/admin/products: every product, ordered by name.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Product>>> {
    let catalog = state.snapshot().await;
    let data = catalog.sorted_by_name().into_iter().cloned().collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// POST /api/v1/admin/products: create a product with a fresh id.
pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = &req_id.0;
    let id = Uuid::new_v4().to_string();

    let catalog = state
        .apply(|current| current.with_created(draft, id.clone(), Utc::now()))
        .await
        .map_err(|e| map_catalog_error(rid.clone(), &e))?;
    let product = stored_product(&catalog, &id, rid)?;

    tracing::info!(product_id = %id, name = %product.name, "product created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: product,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PUT /api/v1/admin/products/{id}: replace the editable fields of a product.
pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let rid = &req_id.0;

    let catalog = state
        .apply(|current| current.with_updated(&id, draft, Utc::now()))
        .await
        .map_err(|e| map_catalog_error(rid.clone(), &e))?;
    let product = stored_product(&catalog, &id, rid)?;

    tracing::info!(product_id = %id, "product updated");

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/admin/products/{id}: remove a product.
pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteProductResponse>>, ApiError> {
    state
        .apply(|current| current.without(&id))
        .await
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;

    tracing::info!(product_id = %id, "product deleted");

    Ok(Json(ApiResponse {
        data: DeleteProductResponse { id, deleted: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
