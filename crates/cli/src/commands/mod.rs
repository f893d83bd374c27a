//! Subcommand implementations.

pub mod auth;
pub mod books;
pub mod cart;
pub mod migrate;

use booksearch_core::storage::keys;
use booksearch_core::{
    CartError, CatalogItem, KeyValueStore, SessionGate, StorageError, WorkId, WorkIdError,
};
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::storage::FileStore;

/// Errors surfaced to the user by a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Not signed in. Run `booksearch login <email>` first.")]
    NotSignedIn,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("{0}. Use a result number or a work id like OL45883W.")]
    InvalidTarget(#[from] WorkIdError),

    #[error("No result #{position} in the last search. Run `booksearch search` first.")]
    NoSuchResult { position: usize },

    #[error("No item #{position} in your cart.")]
    NoSuchCartItem { position: usize },

    #[error("Could not read password: {0}")]
    Input(#[from] std::io::Error),

    #[error(transparent)]
    Migration(#[from] migrate::MigrationError),
}

/// What a command operates on: the state directory and the server.
pub struct Context {
    pub store: FileStore,
    pub api: ApiClient,
}

impl Context {
    /// Refuse unless a session token is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::NotSignedIn`] for an anonymous client.
    pub fn require_session(&self) -> Result<(), CommandError> {
        if SessionGate::new(&self.store).is_authenticated() {
            Ok(())
        } else {
            Err(CommandError::NotSignedIn)
        }
    }
}

/// A `<n|work-key>` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 1-based position in a listing.
    Position(usize),
    Work(WorkId),
}

impl Target {
    /// Parse a positive number as a position, anything else as a work id.
    ///
    /// # Errors
    ///
    /// Returns [`WorkIdError`] if the argument is neither.
    pub fn parse(input: &str) -> Result<Self, WorkIdError> {
        match input.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(Self::Position(n)),
            _ => WorkId::parse(input).map(Self::Work),
        }
    }
}

/// Persist the latest result listing so later commands can refer to `#n`.
fn save_last_search<S: KeyValueStore + ?Sized>(store: &S, items: &[CatalogItem]) {
    let saved = serde_json::to_vec(items)
        .map_err(|source| StorageError::Encode {
            key: keys::LAST_SEARCH.to_owned(),
            source,
        })
        .and_then(|bytes| store.set(keys::LAST_SEARCH, &bytes));

    if let Err(e) = saved {
        tracing::warn!(error = %e, "failed to remember search results");
    }
}

/// The latest result listing, or empty if none is stored or it is unreadable.
fn load_last_search<S: KeyValueStore + ?Sized>(store: &S) -> Vec<CatalogItem> {
    match store.get(keys::LAST_SEARCH) {
        Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding unreadable search results");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read search results");
            Vec::new()
        }
    }
}

/// Look up result `#position` from the last search.
fn search_result<S: KeyValueStore + ?Sized>(
    store: &S,
    position: usize,
) -> Result<CatalogItem, CommandError> {
    position
        .checked_sub(1)
        .and_then(|index| load_last_search(store).into_iter().nth(index))
        .ok_or(CommandError::NoSuchResult { position })
}

/// Find a work in the last search by key.
fn search_result_for<S: KeyValueStore + ?Sized>(store: &S, id: &WorkId) -> Option<CatalogItem> {
    let key = id.key();
    load_last_search(store)
        .into_iter()
        .find(|item| item.key == key)
}
