//! Cart Store
//!
//! The single cart collaborator shared by every page. It owns the [`Cart`], derives prices via
//! its [`PricingPolicy`] and writes the full collection through to [`Storage`] after every change.
//!
//! Persistence is best effort: a failed write is logged and recorded, but the in-memory cart
//! stays authoritative for the rest of the session.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartChange},
    items::{CartLineItem, ProductId},
    pricing::{PriceBreakdown, PricingError, PricingPolicy},
    storage::{Storage, StorageError},
};

/// Storage key holding the serialised cart.
pub const CART_STORAGE_KEY: &str = "cartItems";

/// Errors that can occur while writing the cart to storage.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The cart could not be serialised.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),

    /// The storage backend rejected the write.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Serialises a cart into its persisted JSON form.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if serialisation fails.
pub fn encode_cart(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(cart.items())
}

/// Parses a persisted cart, normalising it through the add path.
///
/// # Errors
///
/// Returns a [`serde_json::Error`] if `raw` is not a JSON array of line items.
pub fn decode_cart(raw: &str) -> Result<Cart, serde_json::Error> {
    let items: Vec<CartLineItem> = serde_json::from_str(raw)?;

    Ok(Cart::from_items(items))
}

/// Cart state with write-through persistence.
#[derive(Debug)]
pub struct CartStore<S: Storage> {
    cart: Cart,
    storage: S,
    policy: PricingPolicy,
    persisted: bool,
}

impl<S: Storage> CartStore<S> {
    /// Hydrates a store from `storage` using the default pricing policy.
    ///
    /// A missing, unreadable or corrupt persisted cart yields an empty cart.
    pub fn load(storage: S) -> Self {
        Self::with_policy(storage, PricingPolicy::default())
    }

    /// Hydrates a store from `storage` with an explicit pricing policy.
    pub fn with_policy(storage: S, policy: PricingPolicy) -> Self {
        let cart = read_cart(&storage);

        Self {
            cart,
            storage,
            policy,
            persisted: true,
        }
    }

    /// Adds the item's quantity (a signed delta) to its cart slot.
    ///
    /// Positive deltas add or increase, negative deltas decrease, and a slot driven to zero
    /// or below is removed. A decrease for a slot that is not in the cart does nothing.
    pub fn add_to_cart(&mut self, item: CartLineItem) -> CartChange {
        let key = item.key();
        let delta = item.quantity();
        let change = self.cart.apply_delta(item);

        debug!(%key, delta, ?change, "applied cart delta");

        if change.is_mutation() {
            self.persist();
        }

        change
    }

    /// Removes a cart slot. Returns `true` if it was present.
    pub fn remove_from_cart(&mut self, product_id: &ProductId, size: &str, color: &str) -> bool {
        let removed = self.cart.remove(product_id, size, color);

        if removed {
            debug!(%product_id, size, color, "removed cart entry");
            self.persist();
        }

        removed
    }

    /// Empties the cart, returning how many entries were removed.
    pub fn clear_cart(&mut self) -> usize {
        let removed = self.cart.clear();

        if removed > 0 {
            debug!(removed, "cleared cart");
            self.persist();
        }

        removed
    }

    /// Re-reads the persisted cart, replacing the in-memory one.
    ///
    /// Another process sharing the same storage is only observed through this call.
    pub fn reload(&mut self) {
        self.cart = read_cart(&self.storage);
        self.persisted = true;
    }

    /// Sum of quantities across all entries (the cart badge count).
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    /// Entries in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        self.cart.items()
    }

    /// The underlying cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.cart.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Pricing rules used for derived totals.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Derives subtotal, discount, delivery charge and total from the current entries.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the amounts overflow.
    pub fn price_breakdown(&self) -> Result<PriceBreakdown, PricingError> {
        self.policy.breakdown(self.cart.items())
    }

    /// Whether the last write to storage succeeded.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Borrow the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store, returning its storage backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Writes the current cart to storage.
    ///
    /// Mutations already do this; call it to retry after a failed write.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the cart cannot be encoded or stored.
    pub fn save(&mut self) -> Result<(), PersistError> {
        let written = encode_cart(&self.cart)
            .map_err(PersistError::from)
            .and_then(|json| {
                self.storage
                    .set(CART_STORAGE_KEY, &json)
                    .map_err(PersistError::from)
            });

        self.persisted = written.is_ok();

        written
    }

    fn persist(&mut self) {
        if let Err(error) = self.save() {
            warn!(%error, "failed to persist cart; keeping in-memory state");
        }
    }
}

fn read_cart<S: Storage>(storage: &S) -> Cart {
    match storage.get(CART_STORAGE_KEY) {
        Ok(Some(raw)) => decode_cart(&raw).unwrap_or_else(|error| {
            warn!(%error, "persisted cart is corrupt; starting empty");
            Cart::new()
        }),
        Ok(None) => Cart::new(),
        Err(error) => {
            warn!(%error, "could not read persisted cart; starting empty");
            Cart::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use mockall::predicate::eq;
    use testresult::TestResult;

    use crate::storage::{FileStorage, MemoryStorage, MockStorage, StorageError};

    use super::*;

    fn shirt(quantity: i64) -> CartLineItem {
        CartLineItem::new("shirt", "Linen Shirt", 1200).with_quantity(quantity)
    }

    #[test]
    fn load_from_empty_storage_is_empty() {
        let store = CartStore::load(MemoryStorage::new());

        assert!(store.is_empty());
        assert!(store.is_persisted());
    }

    #[test]
    fn mutations_are_written_through() -> TestResult {
        let mut store = CartStore::load(MemoryStorage::new());

        store.add_to_cart(shirt(2));

        let raw = store.storage().get(CART_STORAGE_KEY)?.unwrap_or_default();

        assert_eq!(decode_cart(&raw)?, *store.cart());

        Ok(())
    }

    #[test]
    fn ignored_delta_does_not_write() {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage.expect_set().never();

        let mut store = CartStore::load(storage);

        assert_eq!(store.add_to_cart(shirt(-1)), CartChange::Ignored);
        assert!(!store.remove_from_cart(&ProductId::from("shirt"), "M", "Black"));
        assert_eq!(store.clear_cart(), 0);
    }

    #[test]
    fn each_mutation_writes_once() {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage
            .expect_set()
            .with(eq(CART_STORAGE_KEY), mockall::predicate::always())
            .times(3)
            .returning(|_, _| Ok(()));

        let mut store = CartStore::load(storage);

        store.add_to_cart(shirt(1));
        store.add_to_cart(shirt(1));
        store.remove_from_cart(&ProductId::from("shirt"), "M", "Black");
    }

    #[test]
    fn failed_write_keeps_in_memory_state() {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage
            .expect_set()
            .returning(|_, _| Err(StorageError::QuotaExceeded(10, 5)));

        let mut store = CartStore::load(storage);

        assert_eq!(store.add_to_cart(shirt(3)), CartChange::Inserted);
        assert_eq!(store.total_items(), 3);
        assert!(!store.is_persisted());
    }

    #[test]
    fn successful_write_clears_failure_flag() {
        let mut storage = MockStorage::new();
        let mut calls = 0;

        storage.expect_get().returning(|_| Ok(None));
        storage.expect_set().returning(move |_, _| {
            calls += 1;

            if calls == 1 {
                Err(StorageError::Io(io::Error::other("disk full")))
            } else {
                Ok(())
            }
        });

        let mut store = CartStore::load(storage);

        store.add_to_cart(shirt(1));
        assert!(!store.is_persisted());

        store.add_to_cart(shirt(1));
        assert!(store.is_persisted());
    }

    #[test]
    fn save_reports_the_storage_error() {
        let mut storage = MockStorage::new();

        storage.expect_get().returning(|_| Ok(None));
        storage
            .expect_set()
            .times(2)
            .returning(|_, _| Err(StorageError::QuotaExceeded(10, 5)));

        let mut store = CartStore::load(storage);

        store.add_to_cart(shirt(1));

        assert!(matches!(
            store.save(),
            Err(PersistError::Storage(StorageError::QuotaExceeded(10, 5)))
        ));
        assert!(!store.is_persisted());
    }

    #[test]
    fn save_after_recovery_marks_the_cart_persisted() {
        let storage = MemoryStorage::with_quota(16);
        let mut store = CartStore::load(storage);

        store.add_to_cart(shirt(1));
        assert!(!store.is_persisted());

        store.clear_cart();

        assert!(store.save().is_ok());
        assert!(store.is_persisted());
    }

    #[test]
    fn unreadable_storage_starts_empty() {
        let mut storage = MockStorage::new();

        storage
            .expect_get()
            .returning(|_| Err(StorageError::Io(io::Error::other("denied"))));

        let store = CartStore::load(storage);

        assert!(store.is_empty());
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let storage = MemoryStorage::new().with_value(CART_STORAGE_KEY, "{not json");

        let store = CartStore::load(storage);

        assert!(store.is_empty());
    }

    #[test]
    fn reload_picks_up_writes_from_another_store() -> TestResult {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());

        let mut first = CartStore::load(storage.clone());
        let mut second = CartStore::load(storage);

        first.add_to_cart(shirt(4));
        assert_eq!(second.total_items(), 0);

        second.reload();
        assert_eq!(second.total_items(), 4);
        assert_eq!(second.items(), first.items());

        Ok(())
    }

    #[test]
    fn price_breakdown_tracks_current_items() -> TestResult {
        let mut store = CartStore::load(MemoryStorage::new());

        store.add_to_cart(shirt(1));
        assert_eq!(store.price_breakdown()?.total, 1080);

        store.add_to_cart(shirt(-1));
        assert_eq!(store.price_breakdown()?.subtotal, 0);

        Ok(())
    }
}
