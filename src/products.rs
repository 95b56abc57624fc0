//! Products

use thiserror::Error;

use crate::{
    items::{LineItem, ProductId},
    pricing::Price,
};

/// Errors turning a catalog product into a cart line.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// No size was chosen for the product.
    #[error("Product {0} requires a size")]
    SizeRequired(ProductId),

    /// The product has no purchasable variants.
    #[error("Product {0} has no variants")]
    NoVariants(ProductId),
}

/// A purchasable size of a product, with its own price and image.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Size label (e.g. "M")
    pub size: String,

    /// Variant price
    pub price: Price,

    /// Variant image reference
    pub image: Option<String>,
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Catalog identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Sizes on offer, in display order
    pub variants: Vec<Variant>,

    /// Colors on offer
    pub colors: Vec<String>,
}

impl Product {
    /// Find the variant for a size.
    pub fn variant(&self, size: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.size == size)
    }

    /// Build a cart line for the chosen size and color.
    ///
    /// A size the product does not list falls back to the first variant's
    /// price and image, but the chosen size is still recorded on the line.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::SizeRequired`]: no size was chosen.
    /// - [`CatalogError::NoVariants`]: the product has nothing to sell.
    pub fn line_item(
        &self,
        size: Option<&str>,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<LineItem, CatalogError> {
        let size = size.ok_or_else(|| CatalogError::SizeRequired(self.id.clone()))?;

        let variant = self
            .variant(size)
            .or_else(|| self.variants.first())
            .ok_or_else(|| CatalogError::NoVariants(self.id.clone()))?;

        let mut item =
            LineItem::new(self.id.clone(), self.name.clone(), variant.price, quantity).with_size(size);

        if let Some(color) = color {
            item = item.with_color(color);
        }

        if let Some(image) = &variant.image {
            item = item.with_image(image.clone());
        }

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use super::*;

    fn tee() -> Product {
        Product {
            id: ProductId::new("tee"),
            name: "Basic tee".to_string(),
            variants: vec![
                Variant {
                    size: "S".to_string(),
                    price: Money::from_minor(19_900, iso::VND),
                    image: Some("/tee-s.jpg".to_string()),
                },
                Variant {
                    size: "M".to_string(),
                    price: Money::from_minor(21_900, iso::VND),
                    image: None,
                },
            ],
            colors: vec!["black".to_string()],
        }
    }

    #[test]
    fn line_item_uses_selected_variant() -> TestResult {
        let item = tee().line_item(Some("M"), Some("black"), 2)?;

        assert_eq!(item.unit_price(), &Money::from_minor(21_900, iso::VND));
        assert_eq!(item.size(), Some("M"));
        assert_eq!(item.color(), Some("black"));
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.image(), None);

        Ok(())
    }

    #[test]
    fn unknown_size_falls_back_to_first_variant() -> TestResult {
        let item = tee().line_item(Some("XL"), None, 1)?;

        assert_eq!(item.unit_price(), &Money::from_minor(19_900, iso::VND));
        assert_eq!(item.image(), Some("/tee-s.jpg"));
        assert_eq!(item.size(), Some("XL"));

        Ok(())
    }

    #[test]
    fn missing_size_is_rejected() {
        assert_eq!(
            tee().line_item(None, None, 1),
            Err(CatalogError::SizeRequired(ProductId::new("tee")))
        );
    }

    #[test]
    fn product_without_variants_is_rejected() {
        let product = Product {
            variants: Vec::new(),
            ..tee()
        };

        assert_eq!(
            product.line_item(Some("S"), None, 1),
            Err(CatalogError::NoVariants(ProductId::new("tee")))
        );
    }
}
