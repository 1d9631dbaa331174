pub mod app_config;
pub mod catalog;
pub mod config;
pub mod error;
pub mod products;
pub mod query;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, Catalog, CatalogFile, ProductDraft, RELATED_PRODUCTS_LIMIT};
pub use config::{load_app_config, load_app_config_from_env, open_catalog};
pub use error::{CatalogError, ConfigError, QueryError};
pub use products::{Facet, Product, StockStatus, Variants};
pub use query::{CatalogQuery, CategoryCount, FilterCriteria, PriceRange, SortKey};
