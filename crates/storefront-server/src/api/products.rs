use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{
    query::{self, CatalogQuery, FilterCriteria, PriceRange},
    Product, SortKey, StockStatus, RELATED_PRODUCTS_LIMIT,
};

use crate::middleware::RequestId;

use super::{normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ProductPage {
    /// Matches before `limit` was applied.
    total: usize,
    items: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub(super) struct ProductDetail {
    product: Product,
    stock_status: StockStatus,
    related: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ProductListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub sort: Option<String>,
    pub limit: Option<usize>,
}

impl ProductListQuery {
    fn to_catalog_query(&self) -> CatalogQuery {
        CatalogQuery {
            search: self.search.clone().unwrap_or_default(),
            filter: FilterCriteria {
                category: self.category.clone(),
                price_range: PriceRange::from_bounds(self.min_price, self.max_price),
                in_stock_only: self.in_stock.unwrap_or(false),
                featured_only: self.featured.unwrap_or(false),
            },
            sort: self
                .sort
                .as_deref()
                .map_or(SortKey::Default, SortKey::parse_lenient),
        }
    }
}

/// GET /api/v1/products: search, filter and sort the storefront catalog.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ProductListQuery>,
) -> Json<ApiResponse<ProductPage>> {
    let catalog = state.snapshot().await;
    let query = params.to_catalog_query();
    let matches = query::run_query(catalog.products(), &query);

    let total = matches.len();
    let items = matches
        .into_iter()
        .take(normalize_limit(params.limit))
        .cloned()
        .collect();

    Json(ApiResponse {
        data: ProductPage { total, items },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// GET /api/v1/products/featured: featured products in catalog order.
pub(super) async fn list_featured_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Product>>> {
    let catalog = state.snapshot().await;
    let data = catalog.featured().into_iter().cloned().collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// GET /api/v1/products/{id}: one product with stock status and related items.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let catalog = state.snapshot().await;
    let product = catalog.get(&id).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "not_found",
            format!("product '{id}' not found"),
        )
    })?;

    let related = catalog
        .related(&id, RELATED_PRODUCTS_LIMIT)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ApiResponse {
        data: ProductDetail {
            product: product.clone(),
            stock_status: product.stock_status(),
            related,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_string_is_the_default_query() {
        assert_eq!(
            ProductListQuery::default().to_catalog_query(),
            CatalogQuery::default()
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_default() {
        let params = ProductListQuery {
            sort: Some("bestselling".to_string()),
            ..ProductListQuery::default()
        };
        assert_eq!(params.to_catalog_query().sort, SortKey::Default);
    }

    #[test]
    fn single_price_bound_leaves_the_other_open() {
        let params = ProductListQuery {
            max_price: Some(Decimal::new(50, 0)),
            ..ProductListQuery::default()
        };
        let range = params.to_catalog_query().filter.price_range;
        assert_eq!(range, PriceRange::new(Decimal::ZERO, Decimal::new(50, 0)));
    }
}
