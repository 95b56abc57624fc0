//! Item Fixtures

use serde::Deserialize;

/// Wrapper for cart selections in YAML
#[derive(Debug, Deserialize)]
pub struct ItemsFixture {
    /// Selections in the order they are added to the cart
    pub items: Vec<SelectionFixture>,
}

/// A shopper's pick from the catalog
#[derive(Debug, Deserialize)]
pub struct SelectionFixture {
    /// Product id reference
    pub product: String,

    /// Chosen size
    #[serde(default)]
    pub size: Option<String>,

    /// Chosen color
    #[serde(default)]
    pub color: Option<String>,

    /// Units to add
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}
