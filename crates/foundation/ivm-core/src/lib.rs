//! IVM Core
//!
//! Foundation types shared by every tier of the showroom:
//!
//! - the static vehicle [`catalog`] (configuration, not a database)
//! - category filters and sort orders used by the model grid
//! - the crate-wide [`Error`] type

pub mod catalog;

pub use catalog::{
    parse_price, Catalog, CatalogEntry, Category, CategoryFilter, SortOrder, Specs,
    FEATURED_MODELS,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown category filter: {0}")]
    UnknownFilter(String),

    #[error("Unknown sort order: {0}")]
    UnknownSort(String),
}

pub type Result<T> = std::result::Result<T, Error>;
