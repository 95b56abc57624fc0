//! Shipping addresses

use serde::{Deserialize, Serialize};

/// An address from the shopper's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Profile address id
    #[serde(rename = "_id")]
    pub id: String,

    /// Street line
    pub street: String,

    /// City
    pub city: String,

    /// State or province
    pub state: String,

    /// Postal code
    pub zip: String,

    /// Country
    pub country: String,
}

/// Resolve the address to ship to.
///
/// With no explicit selection the first address on file is used. An
/// explicit selection that is not on file resolves to nothing.
pub fn select_address<'a>(
    addresses: &'a [ShippingAddress],
    selected: Option<&str>,
) -> Option<&'a ShippingAddress> {
    match selected {
        Some(id) => addresses.iter().find(|address| address.id == id),
        None => addresses.first(),
    }
}
