//! Domain types for BookSearch.

pub mod catalog;
pub mod email;
pub mod id;
pub mod price;

pub use catalog::{
    CatalogItem, CoverSize, NO_DESCRIPTION, SearchResults, WorkDetails, WorkId, WorkIdError,
    cover_url,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
