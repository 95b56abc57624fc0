//! Fixtures
//!
//! YAML catalogs and cart selections, used by the demo and the integration tests.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    fixtures::items::ItemsFixture,
    items::{LineItem, ProductId},
    pricing::PriceError,
    products::{CatalogError, Product},
};

pub mod items;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid or unknown price
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// A selection could not be turned into a line item
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog products by id
    products: FxHashMap<ProductId, Product>,

    /// Line items built from the selections, in selection order
    items: Vec<LineItem>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            items: Vec::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_products_str(&contents)
    }

    /// Load products from YAML source
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be parsed or if there are currency mismatches.
    pub fn load_products_str(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let fixture: products::ProductsFixture = serde_norway::from_str(contents)?;

        for (id, product_fixture) in fixture.products {
            let product = product_fixture.into_product(ProductId::new(id))?;

            for variant in &product.variants {
                self.check_currency(variant.price.currency())?;
            }

            self.products.insert(product.id.clone(), product);
        }

        Ok(self)
    }

    /// Load cart selections from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_items(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("items").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_items_str(&contents)
    }

    /// Load cart selections from YAML source
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be parsed or if referenced products don't exist.
    pub fn load_items_str(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ItemsFixture = serde_norway::from_str(contents)?;

        for selection in fixture.items {
            let item = self.product(&selection.product)?.line_item(
                selection.size.as_deref(),
                selection.color.as_deref(),
                selection.quantity,
            )?;

            self.items.push(item);
        }

        Ok(self)
    }

    /// Load a complete fixture set by name
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_products(name)?.load_items(name)?;

        Ok(fixture)
    }

    /// Get a product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product, FixtureError> {
        self.products
            .get(&ProductId::new(id))
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// Line items built from the loaded selections
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Currency of the loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Build a cart by adding every selection in order
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or an item is rejected by the cart.
    pub fn cart(&self) -> Result<Cart, FixtureError> {
        Ok(Cart::with_items(self.items.iter().cloned(), self.currency()?)?)
    }

    fn check_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);
                Ok(())
            }
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
