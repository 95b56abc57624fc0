//! Storage
//!
//! Persists the whole cart after every mutation so it survives a reload.
//! Writes are wholesale and the last writer wins.

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError},
    items::{LineItem, LineItemKey},
};

pub mod snapshot;
pub mod stores;

pub use snapshot::{CartSnapshot, SNAPSHOT_VERSION, StoredLineItem};
pub use stores::{FileStore, KeyValueStore, MemoryStore};

/// Errors reading or writing persisted carts.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error in a file-backed store
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored value is not valid snapshot JSON
    #[error("Failed to (de)serialize cart: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was written by an unknown layout version
    #[error("Unsupported cart snapshot version {0}")]
    UnsupportedVersion(u32),

    /// The snapshot names a currency that is not a known ISO currency
    #[error("Unknown currency code in snapshot: {0}")]
    UnknownCurrency(String),

    /// The snapshot breaks a cart invariant
    #[error("Corrupt cart snapshot: {0}")]
    Corrupt(String),

    /// The key cannot be used with this store
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// A cart mutation or rehydration was rejected
    #[error(transparent)]
    Cart(#[from] CartError),
}

impl StorageError {
    /// Whether the error comes from the stored content rather than the store itself.
    pub fn is_rejected_snapshot(&self) -> bool {
        matches!(
            self,
            Self::Json(_)
                | Self::UnsupportedVersion(_)
                | Self::UnknownCurrency(_)
                | Self::Corrupt(_)
                | Self::Cart(_)
        )
    }
}

/// Read and rehydrate the cart stored under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if the store cannot be read or the snapshot is rejected.
pub fn read_cart(store: &impl KeyValueStore, key: &str) -> Result<Option<Cart>, StorageError> {
    let Some(contents) = store.get(key)? else {
        return Ok(None);
    };

    let snapshot: CartSnapshot = serde_json::from_str(&contents)?;

    Ok(Some(Cart::try_from(snapshot)?))
}

/// Serialize `cart` and store it under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if serialization or the write fails.
pub fn write_cart(store: &mut impl KeyValueStore, key: &str, cart: &Cart) -> Result<(), StorageError> {
    let contents = serde_json::to_string(&CartSnapshot::from(cart))?;

    store.set(key, contents)?;

    debug!(
        key = %key,
        lines = cart.len(),
        total_quantity = cart.total_quantity(),
        "cart persisted"
    );

    Ok(())
}

/// A cart bound to a store key, written back after every change.
#[derive(Debug)]
pub struct PersistentCart<S: KeyValueStore> {
    cart: Cart,
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistentCart<S> {
    /// Rehydrate the cart under `key`, or start an empty one.
    ///
    /// A stored snapshot that cannot be used (bad JSON, unknown version,
    /// broken invariants, or another currency) is logged and replaced by an
    /// empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store itself cannot be read.
    pub fn load_or_new(
        store: S,
        key: impl Into<String>,
        currency: &'static Currency,
    ) -> Result<Self, StorageError> {
        let key = key.into();

        let cart = match read_cart(&store, &key) {
            Ok(Some(cart)) if cart.currency() == currency => cart,
            Ok(Some(cart)) => {
                warn!(
                    key = %key,
                    stored = cart.currency().iso_alpha_code,
                    expected = currency.iso_alpha_code,
                    "discarding stored cart in another currency"
                );
                Cart::new(currency)
            }
            Ok(None) => Cart::new(currency),
            Err(err) if err.is_rejected_snapshot() => {
                warn!(key = %key, error = %err, "discarding unreadable stored cart");
                Cart::new(currency)
            }
            Err(err) => return Err(err),
        };

        Ok(Self { cart, store, key })
    }

    /// The current cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Key the cart is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Apply a mutation and persist the result.
    ///
    /// Nothing is written when the mutation fails.
    ///
    /// # Errors
    ///
    /// Returns the mutation's [`CartError`] or a write failure.
    pub fn update<T>(
        &mut self,
        mutate: impl FnOnce(&mut Cart) -> Result<T, CartError>,
    ) -> Result<T, StorageError> {
        let result = mutate(&mut self.cart)?;

        self.save()?;

        Ok(result)
    }

    /// Add a line item and persist.
    ///
    /// # Errors
    ///
    /// See [`Cart::add_item`] and [`PersistentCart::save`].
    pub fn add_item(&mut self, item: LineItem) -> Result<(), StorageError> {
        self.update(|cart| cart.add_item(item))
    }

    /// Remove a line item, persisting only if something was removed.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the write fails.
    pub fn remove_item(&mut self, key: &LineItemKey) -> Result<Option<LineItem>, StorageError> {
        let removed = self.cart.remove_item(key);

        if removed.is_some() {
            self.save()?;
        }

        Ok(removed)
    }

    /// Update a line quantity, persisting only if the line exists.
    ///
    /// # Errors
    ///
    /// See [`Cart::update_quantity`] and [`PersistentCart::save`].
    pub fn update_quantity(&mut self, key: &LineItemKey, quantity: u32) -> Result<bool, StorageError> {
        let updated = self.cart.update_quantity(key, quantity)?;

        if updated {
            self.save()?;
        }

        Ok(updated)
    }

    /// Replace the cart with an empty one and persist it.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the write fails.
    pub fn reset(&mut self) -> Result<(), StorageError> {
        self.cart = Cart::new(self.cart.currency());

        self.save()
    }

    /// Write the current cart to the store.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if serialization or the write fails.
    pub fn save(&mut self) -> Result<(), StorageError> {
        write_cart(&mut self.store, &self.key, &self.cart)
    }

    /// Split into the cart and its store.
    pub fn into_parts(self) -> (Cart, S) {
        (self.cart, self.store)
    }
}
