//! Business logic services for the BookSearch server.
//!
//! # Services
//!
//! - `auth` - Password registration and login, token issuance
//! - `openlibrary` - Catalog upstream client

pub mod auth;
pub mod openlibrary;
