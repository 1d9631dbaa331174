use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Products with this many units or fewer left are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// A single catalog entry as shown on the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Unit price in store currency, e.g. `129.99`.
    pub price: Decimal,
    /// Display image URL. Never consulted by queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Free-text label, stored as entered. Filtering compares it case-insensitively.
    pub category: String,
    pub stock: u32,
    pub featured: bool,
    /// Average review score in `0..=5`.
    pub rating: Decimal,
    pub reviews: u32,
    #[serde(default, skip_serializing_if = "Variants::is_empty")]
    pub variants: Variants,
    #[serde(alias = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// Set by the last admin edit; absent for products never edited.
    #[serde(
        default,
        alias = "updatedAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    #[must_use]
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::from_stock(self.stock)
    }
}

/// The axes a product can vary along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    Color,
    Size,
}

impl Facet {
    pub const ALL: [Facet; 2] = [Facet::Color, Facet::Size];
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facet::Color => write!(f, "color"),
            Facet::Size => write!(f, "size"),
        }
    }
}

/// Variant options per facet. `None` means the product offers no choice for
/// that facet; unknown facet names are rejected when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Variants {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec<String>>,
}

impl Variants {
    /// Options offered for `facet`, in display order.
    #[must_use]
    pub fn options(&self, facet: Facet) -> Option<&[String]> {
        match facet {
            Facet::Color => self.color.as_deref(),
            Facet::Size => self.size.as_deref(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.size.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum StockStatus {
    InStock,
    LowStock { remaining: u32 },
    OutOfStock,
}

impl StockStatus {
    #[must_use]
    pub fn from_stock(stock: u32) -> Self {
        match stock {
            0 => StockStatus::OutOfStock,
            n if n <= LOW_STOCK_THRESHOLD => StockStatus::LowStock { remaining: n },
            _ => StockStatus::InStock,
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "in stock"),
            StockStatus::LowStock { remaining } => write!(f, "{remaining} left"),
            StockStatus::OutOfStock => write!(f, "out of stock"),
        }
    }
}
