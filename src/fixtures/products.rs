//! Product Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    items::ProductId,
    pricing::parse_price,
    products::{Product, Variant},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Sizes on offer
    pub variants: Vec<VariantFixture>,

    /// Colors on offer
    #[serde(default)]
    pub colors: Vec<String>,
}

/// Variant Fixture
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Size label
    pub size: String,

    /// Variant price (e.g., "199000 VND")
    pub price: String,

    /// Variant image reference
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductFixture {
    /// Convert into a catalog product with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if a variant price cannot be parsed.
    pub fn into_product(self, id: ProductId) -> Result<Product, FixtureError> {
        let variants = self
            .variants
            .into_iter()
            .map(|variant| -> Result<Variant, FixtureError> {
                Ok(Variant {
                    price: parse_price(&variant.price)?,
                    size: variant.size,
                    image: variant.image,
                })
            })
            .collect::<Result<Vec<_>, FixtureError>>()?;

        Ok(Product {
            id,
            name: self.name,
            variants,
            colors: self.colors,
        })
    }
}
