use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate product id: '{0}'")]
    DuplicateId(String),

    #[error("product '{id}' has negative price {price}")]
    NegativePrice { id: String, price: Decimal },

    #[error("product '{id}' has rating {rating} outside 0..=5")]
    RatingOutOfRange { id: String, rating: Decimal },

    #[error("product '{0}' not found")]
    NotFound(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown sort key: '{0}'")]
    UnknownSortKey(String),
}
