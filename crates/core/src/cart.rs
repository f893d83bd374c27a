//! Client-side shopping cart.
//!
//! The cart is an ordered, key-deduplicated list of [`CartEntry`] values kept
//! in client-local storage under [`keys::CART`]. Every mutation reads the full
//! collection, changes it, and writes the full collection back before
//! returning. There is no cross-process coordination: two writers racing on
//! the same storage can lose each other's additions.
//!
//! Persisted content is never trusted. Anything that fails to parse or breaks
//! the one-entry-per-key rule loads as an empty cart.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::{KeyValueStore, StorageError, keys};
use crate::types::{CatalogItem, Price};

/// A catalog item with the price it was added at.
///
/// Stored flat: the item's fields sit next to `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub price: Price,
}

impl CartEntry {
    #[must_use]
    pub const fn new(item: CatalogItem, price: Price) -> Self {
        Self { item, price }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.item.key
    }

    /// Check the rules every stored entry must satisfy.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCart`] for an empty key or a price outside
    /// `0..=`[`Price::MAX_ENTRY`].
    pub fn validate(&self) -> Result<(), MalformedCart> {
        if self.key().is_empty() {
            return Err(MalformedCart::EmptyKey);
        }
        if self.price.is_negative() {
            return Err(MalformedCart::NegativePrice(self.key().to_owned()));
        }
        if !self.price.is_valid_entry_price() {
            return Err(MalformedCart::PriceOutOfRange(self.key().to_owned()));
        }
        Ok(())
    }
}

/// Ordered cart contents, at most one entry per key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

/// Why persisted cart content was rejected.
#[derive(Debug, Error)]
pub enum MalformedCart {
    #[error("not a cart: {0}")]
    Json(#[from] serde_json::Error),
    #[error("entry has an empty key")]
    EmptyKey,
    #[error("duplicate entry for key '{0}'")]
    DuplicateKey(String),
    #[error("negative price for key '{0}'")]
    NegativePrice(String),
    #[error("price out of range for key '{0}'")]
    PriceOutOfRange(String),
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse and validate persisted cart bytes.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCart`] if the bytes are not a JSON array of entries,
    /// or if any entry fails [`CartEntry::validate`] or repeats a key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MalformedCart> {
        let entries: Vec<CartEntry> = serde_json::from_slice(bytes)?;

        let mut seen = std::collections::HashSet::with_capacity(entries.len());
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.key()) {
                return Err(MalformedCart::DuplicateKey(entry.key().to_owned()));
            }
        }

        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.key() == key)
    }

    /// Sum of entry prices, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Price {
        self.entries
            .iter()
            .map(|entry| entry.price)
            .sum::<Price>()
            .rounded()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Summary of a completed checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutReceipt {
    /// Cart total before it was cleared.
    pub total: Price,
    /// Number of entries that were in the cart.
    pub item_count: usize,
}

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The key is already in the cart. Nothing was changed.
    #[error("'{title}' is already in your cart")]
    AlreadyPresent { key: String, title: String },

    /// The entry would not survive a reload. Nothing was changed.
    #[error("cannot add to cart: {0}")]
    InvalidEntry(#[from] MalformedCart),

    /// The updated cart could not be written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Cart operations over a [`KeyValueStore`].
pub struct CartStore<'a, S: KeyValueStore + ?Sized> {
    storage: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> CartStore<'a, S> {
    #[must_use]
    pub const fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Read the persisted cart.
    ///
    /// Absent, unreadable, or malformed content yields an empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        self.load_for_update().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to read cart, treating as empty");
            Cart::new()
        })
    }

    /// Append `item` at `price`.
    ///
    /// # Errors
    ///
    /// Leaves storage untouched and returns [`CartError::InvalidEntry`] for an
    /// empty key or out-of-range price, or [`CartError::AlreadyPresent`] if an
    /// entry with the same key exists. Returns [`CartError::Storage`] if the
    /// cart cannot be read or written.
    pub fn add(&self, item: CatalogItem, price: Price) -> Result<Cart, CartError> {
        let entry = CartEntry::new(item, price);
        entry.validate()?;

        let mut cart = self.load_for_update()?;
        if cart.contains(entry.key()) {
            return Err(CartError::AlreadyPresent {
                key: entry.item.key,
                title: entry.item.title,
            });
        }

        tracing::debug!(key = %entry.key(), %price, "adding to cart");
        cart.entries.push(entry);
        self.persist(&cart)?;
        Ok(cart)
    }

    /// Remove the entry for `key`. Removing an absent key changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the cart cannot be read or written.
    pub fn remove(&self, key: &str) -> Result<Cart, CartError> {
        let mut cart = self.load_for_update()?;
        cart.entries.retain(|entry| entry.key() != key);
        self.persist(&cart)?;
        Ok(cart)
    }

    /// Empty the cart and delete the persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the delete fails.
    pub fn clear(&self) -> Result<Cart, CartError> {
        self.storage.delete(keys::CART)?;
        Ok(Cart::new())
    }

    /// Total of the persisted cart, rounded to cents.
    #[must_use]
    pub fn total(&self) -> Price {
        self.load().total()
    }

    /// Check out a non-empty cart.
    ///
    /// Returns the receipt and clears the cart. An empty cart is left alone
    /// and yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if clearing fails; no receipt is issued.
    pub fn checkout(&self) -> Result<Option<CheckoutReceipt>, CartError> {
        let cart = self.load();
        if cart.is_empty() {
            return Ok(None);
        }

        let receipt = CheckoutReceipt {
            total: cart.total(),
            item_count: cart.len(),
        };
        self.clear()?;
        tracing::info!(total = %receipt.total, items = receipt.item_count, "checkout complete");
        Ok(Some(receipt))
    }

    /// Malformed content reads as empty; storage failures propagate.
    fn load_for_update(&self) -> Result<Cart, StorageError> {
        let Some(bytes) = self.storage.get(keys::CART)? else {
            return Ok(Cart::new());
        };

        Ok(Cart::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "discarding malformed cart");
            Cart::new()
        }))
    }

    fn persist(&self, cart: &Cart) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(cart).map_err(|source| StorageError::Encode {
            key: keys::CART.to_owned(),
            source,
        })?;
        self.storage.set(keys::CART, &bytes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use proptest::prelude::*;

    use super::*;
    use crate::storage::MemoryStore;

    fn book(key: &str, title: &str) -> CatalogItem {
        CatalogItem {
            key: key.to_owned(),
            title: title.to_owned(),
            author_names: vec!["Frank Herbert".to_owned()],
            first_publish_year: Some(1965),
            cover_image_id: None,
        }
    }

    fn keys_of(cart: &Cart) -> Vec<&str> {
        cart.iter().map(CartEntry::key).collect()
    }

    #[test]
    fn test_load_empty_store() {
        let store = MemoryStore::new();
        let cart = CartStore::new(&store).load();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.total().to_string(), "$0.00");
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);

        carts
            .add(book("W1", "Dune"), Price::from_cents(1999))
            .unwrap();
        let before = store.get(keys::CART).unwrap();

        let err = carts
            .add(book("W1", "Dune"), Price::from_cents(2500))
            .unwrap_err();
        assert!(matches!(err, CartError::AlreadyPresent { ref key, .. } if key == "W1"));
        assert_eq!(err.to_string(), "'Dune' is already in your cart");

        assert_eq!(store.get(keys::CART).unwrap(), before);
        let cart = carts.load();
        assert_eq!(cart.len(), 1);
        assert_eq!(carts.total(), Price::from_cents(1999));
    }

    #[test]
    fn test_remove_keeps_other_entries() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);

        carts.add(book("W1", "Dune"), Price::from_cents(1000)).unwrap();
        carts
            .add(book("W2", "Emma"), Price::from_cents(1550))
            .unwrap();
        let cart = carts.remove("W1").unwrap();

        assert_eq!(keys_of(&cart), vec!["W2"]);
        assert_eq!(cart.get("W2").unwrap().price, Price::from_cents(1550));
        assert_eq!(carts.total(), Price::from_cents(1550));
        assert_eq!(carts.load(), cart);
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);
        carts.add(book("W1", "Dune"), Price::from_cents(1000)).unwrap();

        let cart = carts.remove("W9").unwrap();
        assert_eq!(keys_of(&cart), vec!["W1"]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);
        for key in ["W3", "W1", "W2"] {
            carts.add(book(key, key), Price::from_cents(999)).unwrap();
        }
        assert_eq!(keys_of(&carts.load()), vec!["W3", "W1", "W2"]);
    }

    #[test]
    fn test_clear_deletes_record() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);
        carts.add(book("W1", "Dune"), Price::from_cents(1000)).unwrap();

        let cart = carts.clear().unwrap();
        assert!(cart.is_empty());
        assert_eq!(store.get(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_checkout_returns_receipt_and_clears() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);
        carts.add(book("W1", "Dune"), Price::from_cents(1000)).unwrap();
        carts
            .add(book("W2", "Emma"), Price::from_cents(1550))
            .unwrap();

        let receipt = carts.checkout().unwrap().unwrap();
        assert_eq!(receipt.total, Price::from_cents(2550));
        assert_eq!(receipt.item_count, 2);
        assert!(carts.load().is_empty());
        assert_eq!(store.get(keys::CART).unwrap(), None);
    }

    #[test]
    fn test_checkout_empty_cart_is_noop() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);

        assert!(carts.checkout().unwrap().is_none());
        assert!(carts.load().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_content_loads_empty() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);

        let inputs: [&[u8]; 8] = [
            b"not json at all",
            b"{\"key\": \"W1\"}",
            b"[{\"key\": \"W1\"}]",
            b"[{\"key\": \"\", \"title\": \"x\", \"price\": 1}]",
            b"[{\"key\": \"W1\", \"title\": \"x\", \"price\": -5}]",
            b"[{\"key\": \"W1\", \"title\": \"x\", \"price\": 1},\
               {\"key\": \"W1\", \"title\": \"y\", \"price\": 2}]",
            b"[{\"key\": \"W1\", \"title\": \"x\", \"price\": \"1000000.01\"}]",
            b"[{\"key\": \"W1\", \"title\": \"x\", \"price\": \"50000000000000000000000000000\"},\
               {\"key\": \"W2\", \"title\": \"y\", \"price\": \"50000000000000000000000000000\"}]",
        ];
        for bad in inputs {
            store.set(keys::CART, bad).unwrap();
            assert!(carts.load().is_empty(), "{}", String::from_utf8_lossy(bad));
            assert_eq!(carts.total(), Price::ZERO);
            assert!(carts.checkout().unwrap().is_none());
        }
    }

    #[test]
    fn test_ceiling_price_is_accepted() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);
        carts.add(book("W1", "a"), Price::MAX_ENTRY).unwrap();
        carts.add(book("W2", "b"), Price::MAX_ENTRY).unwrap();

        assert_eq!(carts.load().len(), 2);
        assert_eq!(carts.total(), Price::from_cents(200_000_000));
    }

    #[test]
    fn test_invalid_add_keeps_existing_entries() {
        let store = MemoryStore::new();
        let carts = CartStore::new(&store);
        carts.add(book("W1", "Dune"), Price::from_cents(1000)).unwrap();
        carts.add(book("W2", "Emma"), Price::from_cents(1550)).unwrap();
        let before = store.get(keys::CART).unwrap();

        let err = carts
            .add(book("W3", "Ubik"), Price::from_cents(-1))
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::InvalidEntry(MalformedCart::NegativePrice(ref key)) if key == "W3"
        ));
        assert!(matches!(
            carts.add(book("", "Nameless"), Price::from_cents(500)),
            Err(CartError::InvalidEntry(MalformedCart::EmptyKey))
        ));
        assert!(matches!(
            carts.add(book("W4", "Gold"), Price::from_cents(100_000_001)),
            Err(CartError::InvalidEntry(MalformedCart::PriceOutOfRange(_)))
        ));

        assert_eq!(store.get(keys::CART).unwrap(), before);
        assert_eq!(keys_of(&carts.load()), vec!["W1", "W2"]);
    }

    /// Fails the next `get` once armed.
    struct FlakyStore {
        inner: MemoryStore,
        fail_next_get: AtomicBool,
    }

    impl FlakyStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_next_get: AtomicBool::new(false),
            }
        }

        fn fail_next_get(&self) {
            self.fail_next_get.store(true, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            if self.fail_next_get.swap(false, Ordering::SeqCst) {
                return Err(std::io::Error::other("read failed").into());
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }

        fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key)
        }
    }

    #[test]
    fn test_read_failure_during_mutation_keeps_cart() {
        let store = FlakyStore::new();
        let carts = CartStore::new(&store);
        for key in ["W1", "W2", "W3"] {
            carts.add(book(key, key), Price::from_cents(999)).unwrap();
        }

        store.fail_next_get();
        assert!(matches!(
            carts.add(book("W4", "W4"), Price::from_cents(999)),
            Err(CartError::Storage(StorageError::Io(_)))
        ));
        assert_eq!(keys_of(&carts.load()), vec!["W1", "W2", "W3"]);

        store.fail_next_get();
        assert!(matches!(carts.remove("W1"), Err(CartError::Storage(_))));
        assert_eq!(keys_of(&carts.load()), vec!["W1", "W2", "W3"]);

        store.fail_next_get();
        assert!(carts.load().is_empty());
        assert_eq!(carts.load().len(), 3);
    }

    #[test]
    fn test_loads_cart_with_numeric_prices() {
        let store = MemoryStore::new();
        store
            .set(
                keys::CART,
                br#"[{"key":"/works/OL1W","title":"Dune","author_name":["Frank Herbert"],"cover_i":42,"price":19.99}]"#,
            )
            .unwrap();

        let cart = CartStore::new(&store).load();
        assert_eq!(cart.len(), 1);
        let entry = cart.get("/works/OL1W").unwrap();
        assert_eq!(entry.price, Price::from_cents(1999));
        assert_eq!(entry.item.cover_image_id, Some(42));
    }

    #[test]
    fn test_persisted_shape_is_flat() {
        let store = MemoryStore::new();
        CartStore::new(&store)
            .add(book("W1", "Dune"), Price::from_cents(1999))
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&store.get(keys::CART).unwrap().unwrap()).unwrap();
        assert_eq!(raw[0]["key"], "W1");
        assert_eq!(raw[0]["title"], "Dune");
        assert_eq!(raw[0]["price"], "19.99");
    }

    #[test]
    fn test_total_rounds_to_cents() {
        let cart = Cart {
            entries: vec![
                CartEntry::new(book("W1", "a"), Price::new(rust_decimal::Decimal::new(1005, 3))),
                CartEntry::new(book("W2", "b"), Price::from_cents(100)),
            ],
        };
        assert_eq!(cart.total(), Price::from_cents(201));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8, i64),
        Remove(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..6, 999i64..=2999).prop_map(|(k, cents)| Op::Add(k, cents)),
            (0u8..6).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn keys_stay_unique(ops in prop::collection::vec(op(), 0..40)) {
            let store = MemoryStore::new();
            let carts = CartStore::new(&store);
            let mut expected_total = Price::ZERO;

            for op in ops {
                match op {
                    Op::Add(k, cents) => {
                        let key = format!("W{k}");
                        let present = carts.load().contains(&key);
                        let result = carts.add(book(&key, "t"), Price::from_cents(cents));
                        prop_assert_eq!(result.is_err(), present);
                        if !present {
                            expected_total = expected_total + Price::from_cents(cents);
                        }
                    }
                    Op::Remove(k) => {
                        let key = format!("W{k}");
                        if let Some(entry) = carts.load().get(&key) {
                            expected_total = Price::new(expected_total.amount() - entry.price.amount());
                        }
                        carts.remove(&key).unwrap();
                    }
                }

                let cart = carts.load();
                let mut keys: Vec<&str> = keys_of(&cart);
                let len = keys.len();
                keys.sort_unstable();
                keys.dedup();
                prop_assert_eq!(keys.len(), len);
                prop_assert_eq!(cart.total(), expected_total.rounded());
            }
        }

        #[test]
        fn add_then_remove_restores_cart(
            existing in prop::collection::btree_set(0u16..500, 0..10),
            new_key in 500u16..1000,
            cents in 999i64..=2999,
        ) {
            let store = MemoryStore::new();
            let carts = CartStore::new(&store);
            for k in &existing {
                carts.add(book(&format!("W{k}"), "t"), Price::from_cents(1234)).unwrap();
            }
            let before = carts.load();

            let key = format!("W{new_key}");
            carts.add(book(&key, "new"), Price::from_cents(cents)).unwrap();
            let after = carts.remove(&key).unwrap();

            prop_assert_eq!(after, before);
        }
    }
}
