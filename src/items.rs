//! Line Items

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pricing::{Price, line_amount};

/// Product identifier as issued by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identity of a line item within a cart: product, size and color.
///
/// An absent size or color is its own value and never equal to any string,
/// including the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineItemKey {
    product_id: ProductId,
    size: Option<String>,
    color: Option<String>,
}

impl LineItemKey {
    /// Create a key from its three parts.
    pub fn new(product_id: impl Into<ProductId>, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            product_id: product_id.into(),
            size: size.map(str::to_string),
            color: color.map(str::to_string),
        }
    }

    /// Product the line refers to
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Selected size, if any
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }

    /// Selected color, if any
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }
}

impl fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.product_id,
            self.size.as_deref().unwrap_or("-"),
            self.color.as_deref().unwrap_or("-"),
        )
    }
}

/// A single row in the cart.
///
/// The unit price is captured when the line is created and is never
/// refreshed from the catalog afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    key: LineItemKey,
    name: String,
    image: Option<String>,
    unit_price: Price,
    quantity: u32,
}

impl LineItem {
    /// Create a line item with no size, color or image.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Price,
        quantity: u32,
    ) -> Self {
        Self {
            key: LineItemKey::new(product_id, None, None),
            name: name.into(),
            image: None,
            unit_price,
            quantity,
        }
    }

    /// Set the size variant.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.key.size = Some(size.into());
        self
    }

    /// Set the color variant.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.key.color = Some(color.into());
        self
    }

    /// Set the display image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Identity of this line
    pub fn key(&self) -> &LineItemKey {
        &self.key
    }

    /// Product the line refers to
    pub fn product_id(&self) -> &ProductId {
        &self.key.product_id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display image reference
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Selected size, if any
    pub fn size(&self) -> Option<&str> {
        self.key.size()
    }

    /// Selected color, if any
    pub fn color(&self) -> Option<&str> {
        self.key.color()
    }

    /// Price of a single unit
    pub fn unit_price(&self) -> &Price {
        &self.unit_price
    }

    /// Number of units
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Price of all units on this line, or `None` if it does not fit in minor units.
    pub fn line_total(&self) -> Option<Price> {
        line_amount(self.unit_price.to_minor_units(), self.quantity)
            .map(|amount| Price::from_minor(amount, self.unit_price.currency()))
    }
}
