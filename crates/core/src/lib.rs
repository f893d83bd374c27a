//! BookSearch Core - shared types and client state.
//!
//! Used by every BookSearch component:
//! - `server` - catalog proxy and auth API
//! - `cli` - the terminal storefront
//!
//! # Architecture
//!
//! No network I/O lives here. Client state (the cart and the session) is
//! written against the [`storage::KeyValueStore`] trait, so the same logic
//! runs over a directory on disk or an in-memory map.
//!
//! # Modules
//!
//! - [`types`] - catalog records, prices, emails and IDs
//! - [`storage`] - the key-value persistence seam
//! - [`cart`] - the Cart Store
//! - [`session`] - the Session Gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod session;
pub mod storage;
pub mod types;

pub use cart::{Cart, CartEntry, CartError, CartStore, CheckoutReceipt, MalformedCart};
pub use session::{Session, SessionGate};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use types::*;
