use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::query::{self, FilterCriteria};
use crate::{CatalogError, ConfigError, Product, Variants};

/// Seed catalog shipped with the storefront.
const SEED_CATALOG_YAML: &str = include_str!("../../../config/catalog.yaml");

/// Number of related products shown on a product detail page.
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// On-disk catalog layout.
#[derive(Debug, Deserialize, Serialize)]
pub struct CatalogFile {
    pub products: Vec<Product>,
}

/// An immutable, validated snapshot of the product catalog.
///
/// Admin edits never touch an existing snapshot; `with_created`,
/// `with_updated` and `without` each return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Build a snapshot, checking id uniqueness, price and rating bounds.
    ///
    /// # Errors
    ///
    /// Returns the first `CatalogError` found while scanning in order.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        validate_products(&products)?;
        Ok(Self {
            products: products.into(),
        })
    }

    /// The built-in seed catalog.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the embedded seed file fails to parse or validate.
    pub fn seed() -> Result<Self, ConfigError> {
        parse_catalog(SEED_CATALOG_YAML)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn featured(&self) -> Vec<&Product> {
        query::filter(
            self.products.iter(),
            &FilterCriteria {
                featured_only: true,
                ..FilterCriteria::default()
            },
        )
    }

    /// Products in `category`, compared case-insensitively.
    #[must_use]
    pub fn by_category(&self, category: &str) -> Vec<&Product> {
        query::filter(
            self.products.iter(),
            &FilterCriteria {
                category: Some(category.to_string()),
                ..FilterCriteria::default()
            },
        )
    }

    /// Up to `limit` other products sharing the stored category of `id`.
    ///
    /// Returns an empty list when `id` is unknown.
    #[must_use]
    pub fn related(&self, id: &str, limit: usize) -> Vec<&Product> {
        let Some(product) = self.get(id) else {
            return Vec::new();
        };

        self.products
            .iter()
            .filter(|p| p.category == product.category && p.id != product.id)
            .take(limit)
            .collect()
    }

    /// Admin listing order: by name, ties by id.
    #[must_use]
    pub fn sorted_by_name(&self) -> Vec<&Product> {
        let mut products: Vec<&Product> = self.products.iter().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        products
    }

    /// New snapshot with a product built from `draft` appended.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for an invalid draft and
    /// `CatalogError::DuplicateId` if `id` is already taken.
    pub fn with_created(
        &self,
        draft: ProductDraft,
        id: String,
        now: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        draft.validate()?;
        if self.get(&id).is_some() {
            return Err(CatalogError::DuplicateId(id));
        }

        let mut products = self.products.to_vec();
        products.push(draft.into_product(id, Decimal::ZERO, 0, now, None));
        Self::new(products)
    }

    /// New snapshot with the editable fields of `id` replaced by `draft`,
    /// stamped with `updated_at = now`. Rating, review count and creation
    /// time carry over.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown id and
    /// `CatalogError::Validation` for an invalid draft.
    pub fn with_updated(
        &self,
        id: &str,
        draft: ProductDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, CatalogError> {
        draft.validate()?;
        let existing = self
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
        let updated = draft.into_product(
            existing.id.clone(),
            existing.rating,
            existing.reviews,
            existing.created_at,
            Some(now),
        );

        let products = self
            .products
            .iter()
            .map(|p| if p.id == id { updated.clone() } else { p.clone() })
            .collect();
        Self::new(products)
    }

    /// New snapshot without `id`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown id.
    pub fn without(&self, id: &str) -> Result<Self, CatalogError> {
        if self.get(id).is_none() {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        let products = self.products.iter().filter(|p| p.id != id).cloned().collect();
        Self::new(products)
    }
}

/// Admin form payload for creating or editing a product.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub variants: Variants,
}

impl ProductDraft {
    const MIN_NAME_CHARS: usize = 2;
    const MIN_CATEGORY_CHARS: usize = 2;
    const MIN_DESCRIPTION_CHARS: usize = 10;
    const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

    /// Check the admin form rules, reporting the first failing field.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().chars().count() < Self::MIN_NAME_CHARS {
            return Err(CatalogError::Validation {
                field: "name",
                reason: "product name is required".to_string(),
            });
        }
        if self.price < Self::MIN_PRICE {
            return Err(CatalogError::Validation {
                field: "price",
                reason: format!("price must be greater than 0, got {}", self.price),
            });
        }
        if self.category.trim().chars().count() < Self::MIN_CATEGORY_CHARS {
            return Err(CatalogError::Validation {
                field: "category",
                reason: "category is required".to_string(),
            });
        }
        if self.description.trim().chars().count() < Self::MIN_DESCRIPTION_CHARS {
            return Err(CatalogError::Validation {
                field: "description",
                reason: format!(
                    "description should be at least {} characters",
                    Self::MIN_DESCRIPTION_CHARS
                ),
            });
        }
        Ok(())
    }

    fn into_product(
        self,
        id: String,
        rating: Decimal,
        reviews: u32,
        created_at: DateTime<Utc>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price,
            image: self.image,
            category: self.category.trim().to_string(),
            stock: self.stock,
            featured: self.featured,
            rating,
            reviews,
            variants: self.variants,
            created_at,
            updated_at,
        }
    }
}

/// Load and validate a catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog = parse_catalog(&content)?;
    tracing::info!(
        path = %path.display(),
        products = catalog.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

fn parse_catalog(content: &str) -> Result<Catalog, ConfigError> {
    let file: CatalogFile = serde_yaml::from_str(content)?;
    Ok(Catalog::new(file.products)?)
}

fn validate_products(products: &[Product]) -> Result<(), CatalogError> {
    let mut seen_ids = HashSet::new();

    for product in products {
        if !seen_ids.insert(product.id.as_str()) {
            return Err(CatalogError::DuplicateId(product.id.clone()));
        }

        if product.price < Decimal::ZERO {
            return Err(CatalogError::NegativePrice {
                id: product.id.clone(),
                price: product.price,
            });
        }

        if product.rating < Decimal::ZERO || product.rating > MAX_RATING {
            return Err(CatalogError::RatingOutOfRange {
                id: product.id.clone(),
                rating: product.rating,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
