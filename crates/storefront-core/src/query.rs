//! Catalog query engine: search, conjunctive filtering and sort policies.
//!
//! Every operation is a pure function over a borrowed product slice. Results
//! are vectors of references into the caller's snapshot, so a query never
//! copies or mutates product records.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Product, QueryError};

/// Inclusive price bounds. The default range admits every price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    #[must_use]
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Build a range from optional bounds, leaving a missing side unbounded.
    #[must_use]
    pub fn from_bounds(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        let full = Self::default();
        Self {
            min: min.unwrap_or(full.min),
            max: max.unwrap_or(full.max),
        }
    }

    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && price <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::MAX,
        }
    }
}

/// The filter half of a storefront query. Inactive criteria are the
/// defaults: no category, unbounded prices, both flags off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Matched case-insensitively against `Product::category`. Empty means any.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub in_stock_only: bool,
    #[serde(default)]
    pub featured_only: bool,
}

impl FilterCriteria {
    fn active_category(&self) -> Option<String> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Keep the order produced by filtering.
    #[default]
    #[serde(rename = "default")]
    Default,
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "newest")]
    Newest,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Default,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::Rating,
        SortKey::Newest,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Default => "default",
            SortKey::PriceAsc => "price-asc",
            SortKey::PriceDesc => "price-desc",
            SortKey::Rating => "rating",
            SortKey::Newest => "newest",
        }
    }

    /// Parse a sort key, treating anything unrecognized as [`SortKey::Default`].
    /// Unknown keys are logged at `warn`.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse::<SortKey>().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "falling back to default sort order");
            SortKey::Default
        })
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| QueryError::UnknownSortKey(s.to_string()))
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete storefront query: optional search, filters, then ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search: String,
    pub filter: FilterCriteria,
    pub sort: SortKey,
}

/// A category label and the number of products filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Distinct categories in order of first appearance.
#[must_use]
pub fn category_index(products: &[Product]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for product in products {
        if !seen.contains(&product.category.as_str()) {
            seen.push(&product.category);
        }
    }
    seen
}

/// Category index with per-category product counts, same order as
/// [`category_index`].
#[must_use]
pub fn category_counts(products: &[Product]) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for product in products {
        *counts.entry(product.category.as_str()).or_default() += 1;
    }

    category_index(products)
        .into_iter()
        .map(|name| CategoryCount {
            name: name.to_string(),
            count: counts.get(name).copied().unwrap_or_default(),
        })
        .collect()
}

/// Case-insensitive substring search over name, description and category.
///
/// A blank query (empty or whitespace only) returns every product. Any other
/// query is matched as given, without trimming.
#[must_use]
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    if query.trim().is_empty() {
        return products.iter().collect();
    }

    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|p| matches_search(p, &needle))
        .collect()
}

/// `needle` must already be lower-cased.
fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.category.to_lowercase().contains(needle)
}

/// Keep the products satisfying every active criterion, preserving input order.
pub fn filter<'a, I>(products: I, criteria: &FilterCriteria) -> Vec<&'a Product>
where
    I: IntoIterator<Item = &'a Product>,
{
    let category = criteria.active_category();

    products
        .into_iter()
        .filter(|p| {
            category
                .as_deref()
                .is_none_or(|wanted| p.category.to_lowercase() == wanted)
        })
        .filter(|p| criteria.price_range.contains(p.price))
        .filter(|p| !criteria.in_stock_only || p.is_in_stock())
        .filter(|p| !criteria.featured_only || p.featured)
        .collect()
}

/// Reorder `products` in place. `sort_by` is stable, so ties keep their
/// relative input order.
pub fn sort(products: &mut [&Product], key: SortKey) {
    match key {
        SortKey::Default => {}
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Rating => products.sort_by(|a, b| b.rating.cmp(&a.rating)),
        SortKey::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// Run search, filter and sort in that order.
#[must_use]
pub fn run_query<'a>(products: &'a [Product], query: &CatalogQuery) -> Vec<&'a Product> {
    let searched = search(products, &query.search);
    let mut result = filter(searched, &query.filter);
    sort(&mut result, query.sort);

    tracing::debug!(
        search = %query.search,
        sort = %query.sort,
        matched = result.len(),
        total = products.len(),
        "catalog query evaluated"
    );

    result
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
