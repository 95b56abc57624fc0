//! Cart Snapshots
//!
//! The serialized form of a cart. Totals are not stored; they are rebuilt
//! from the lines when a snapshot is turned back into a [`Cart`].

use rustc_hash::FxHashSet;
use rusty_money::Money;
use serde::{Deserialize, Serialize};

use crate::{
    cart::Cart,
    items::{LineItem, LineItemKey, ProductId},
    pricing::find_currency,
    storage::StorageError,
};

/// Current snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Versioned, serializable cart state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    /// Layout version
    pub version: u32,

    /// ISO currency code of every price in the snapshot
    pub currency: String,

    /// Lines in insertion order
    pub items: Vec<StoredLineItem>,
}

/// A line as stored. Absent size or color is written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLineItem {
    /// Product id
    pub product_id: ProductId,

    /// Display name
    pub name: String,

    /// Display image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Unit price in minor units
    pub unit_price: i64,

    /// Size variant
    pub size: Option<String>,

    /// Color variant
    pub color: Option<String>,

    /// Number of units
    pub quantity: u32,
}

impl From<&LineItem> for StoredLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id().clone(),
            name: item.name().to_string(),
            image: item.image().map(str::to_string),
            unit_price: item.unit_price().to_minor_units(),
            size: item.size().map(str::to_string),
            color: item.color().map(str::to_string),
            quantity: item.quantity(),
        }
    }
}

impl From<&Cart> for CartSnapshot {
    fn from(cart: &Cart) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            currency: cart.currency().iso_alpha_code.to_string(),
            items: cart.iter().map(StoredLineItem::from).collect(),
        }
    }
}

impl TryFrom<CartSnapshot> for Cart {
    type Error = StorageError;

    fn try_from(snapshot: CartSnapshot) -> Result<Self, Self::Error> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StorageError::UnsupportedVersion(snapshot.version));
        }

        let currency = find_currency(&snapshot.currency)
            .map_err(|_err| StorageError::UnknownCurrency(snapshot.currency.clone()))?;

        let mut seen = FxHashSet::default();
        let mut cart = Cart::new(currency);

        for stored in snapshot.items {
            let key = LineItemKey::new(
                stored.product_id.clone(),
                stored.size.as_deref(),
                stored.color.as_deref(),
            );

            if !seen.insert(key.clone()) {
                return Err(StorageError::Corrupt(format!("duplicate line {key}")));
            }

            let mut item = LineItem::new(
                stored.product_id,
                stored.name,
                Money::from_minor(stored.unit_price, currency),
                stored.quantity,
            );

            if let Some(size) = stored.size {
                item = item.with_size(size);
            }

            if let Some(color) = stored.color {
                item = item.with_color(color);
            }

            if let Some(image) = stored.image {
                item = item.with_image(image);
            }

            cart.add_item(item)?;
        }

        Ok(cart)
    }
}
