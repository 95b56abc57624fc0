//! Cart
//!
//! The cart ledger: line items unique by [`LineItemKey`], with the total
//! quantity and total amount kept in step with the items on every mutation.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    items::{LineItem, LineItemKey},
    pricing::{Price, line_amount},
};

/// Errors raised by cart mutations. A failed mutation leaves the cart untouched.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// Quantities must be at least one.
    #[error("Quantity must be at least 1, got {0}")]
    InvalidQuantity(u32),

    /// Unit prices must not be negative (minor units).
    #[error("Unit price must not be negative, got {0}")]
    NegativePrice(i64),

    /// An item's currency differs from the cart currency (item currency, cart currency).
    #[error("Item has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// A quantity or amount no longer fits its integer type.
    #[error("Cart totals overflow")]
    Overflow,
}

/// Clamp a raw quantity (e.g. from a numeric input) into the accepted range.
pub fn clamp_quantity(raw: i64) -> u32 {
    u32::try_from(raw.max(1)).unwrap_or(u32::MAX)
}

/// Cart
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
    currency: &'static Currency,
    total_quantity: u64,
    total_amount: i64,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
            total_quantity: 0,
            total_amount: 0,
        }
    }

    /// Create a cart by adding each item in order.
    ///
    /// Items sharing a key are merged exactly as [`Cart::add_item`] would.
    ///
    /// # Errors
    ///
    /// Returns the first [`CartError`] raised while adding an item.
    pub fn with_items(
        items: impl IntoIterator<Item = LineItem>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let mut cart = Cart::new(currency);

        items
            .into_iter()
            .try_for_each(|item| cart.add_item(item))?;

        Ok(cart)
    }

    /// Add a line item, merging it into an existing line with the same key.
    ///
    /// A merged line keeps its original name, image and unit price; only the
    /// quantity grows, and the totals grow by the stored unit price.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: the candidate quantity is zero.
    /// - [`CartError::NegativePrice`]: the candidate unit price is negative.
    /// - [`CartError::CurrencyMismatch`]: the candidate is priced in another currency.
    /// - [`CartError::Overflow`]: a quantity or total would overflow.
    pub fn add_item(&mut self, candidate: LineItem) -> Result<(), CartError> {
        let quantity = validate_quantity(candidate.quantity())?;
        self.validate_price(candidate.unit_price())?;

        let position = self.position(candidate.key());

        let (unit_minor, merged_quantity) = match position.and_then(|idx| self.items.get(idx)) {
            Some(existing) => (
                existing.unit_price().to_minor_units(),
                Some(
                    existing
                        .quantity()
                        .checked_add(quantity)
                        .ok_or(CartError::Overflow)?,
                ),
            ),
            None => (candidate.unit_price().to_minor_units(), None),
        };

        let (total_quantity, total_amount) =
            self.adjusted_totals(0, 0, u64::from(quantity), unit_minor, quantity)?;

        match (position, merged_quantity) {
            (Some(idx), Some(merged)) => {
                if let Some(existing) = self.items.get_mut(idx) {
                    existing.set_quantity(merged);
                }
            }
            _ => self.items.push(candidate),
        }

        self.total_quantity = total_quantity;
        self.total_amount = total_amount;

        debug!(
            added = quantity,
            merged = merged_quantity.is_some(),
            total_quantity,
            total_amount,
            "cart item added"
        );

        Ok(())
    }

    /// Remove the line with the given key, returning it.
    ///
    /// Removing a key that is not in the cart is a no-op.
    pub fn remove_item(&mut self, key: &LineItemKey) -> Option<LineItem> {
        let idx = self.position(key)?;
        let removed = self.items.remove(idx);

        let amount = line_amount(removed.unit_price().to_minor_units(), removed.quantity())
            .unwrap_or(self.total_amount);

        self.total_quantity = self
            .total_quantity
            .saturating_sub(u64::from(removed.quantity()));
        self.total_amount = self.total_amount.saturating_sub(amount);

        debug!(
            %key,
            removed = removed.quantity(),
            total_quantity = self.total_quantity,
            total_amount = self.total_amount,
            "cart item removed"
        );

        Some(removed)
    }

    /// Set the quantity of the line with the given key.
    ///
    /// Returns `false` without changing anything when the key is not in the cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::Overflow`]: the totals would overflow.
    pub fn update_quantity(&mut self, key: &LineItemKey, quantity: u32) -> Result<bool, CartError> {
        let quantity = validate_quantity(quantity)?;

        let Some(idx) = self.position(key) else {
            return Ok(false);
        };

        let Some(item) = self.items.get(idx) else {
            return Ok(false);
        };

        let previous = item.quantity();
        let unit_minor = item.unit_price().to_minor_units();

        let (total_quantity, total_amount) = self.adjusted_totals(
            u64::from(previous),
            line_amount(unit_minor, previous).ok_or(CartError::Overflow)?,
            u64::from(quantity),
            unit_minor,
            quantity,
        )?;

        if let Some(item) = self.items.get_mut(idx) {
            item.set_quantity(quantity);
        }

        self.total_quantity = total_quantity;
        self.total_amount = total_amount;

        debug!(
            %key,
            previous,
            quantity,
            total_quantity,
            total_amount,
            "cart item quantity updated"
        );

        Ok(true)
    }

    /// Add one unit to the line with the given key.
    ///
    /// Returns the new quantity, or `None` if the key is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the quantity or totals would overflow.
    pub fn increment(&mut self, key: &LineItemKey) -> Result<Option<u32>, CartError> {
        let Some(current) = self.get(key).map(LineItem::quantity) else {
            return Ok(None);
        };

        let next = current.checked_add(1).ok_or(CartError::Overflow)?;
        self.update_quantity(key, next)?;

        Ok(Some(next))
    }

    /// Take one unit off the line with the given key, stopping at one.
    ///
    /// Returns the resulting quantity, or `None` if the key is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the totals would overflow.
    pub fn decrement(&mut self, key: &LineItemKey) -> Result<Option<u32>, CartError> {
        let Some(current) = self.get(key).map(LineItem::quantity) else {
            return Ok(None);
        };

        if current <= 1 {
            return Ok(Some(current));
        }

        self.update_quantity(key, current - 1)?;

        Ok(Some(current - 1))
    }

    /// Set a quantity from unchecked input, clamping anything below one up to one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the totals would overflow.
    pub fn set_quantity_clamped(&mut self, key: &LineItemKey, raw: i64) -> Result<bool, CartError> {
        self.update_quantity(key, clamp_quantity(raw))
    }

    /// Look up a line by key.
    pub fn get(&self, key: &LineItemKey) -> Option<&LineItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Sum of quantities across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    /// Sum of unit price times quantity across all lines.
    pub fn total_amount(&self) -> Price {
        Money::from_minor(self.total_amount, self.currency)
    }

    /// Get the number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn position(&self, key: &LineItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    fn validate_price(&self, price: &Price) -> Result<(), CartError> {
        let item_currency = price.currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                item_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let minor = price.to_minor_units();

        if minor < 0 {
            return Err(CartError::NegativePrice(minor));
        }

        Ok(())
    }

    /// Totals after taking one line's contribution out and putting another in.
    fn adjusted_totals(
        &self,
        out_quantity: u64,
        out_amount: i64,
        in_quantity: u64,
        in_unit_minor: i64,
        in_units: u32,
    ) -> Result<(u64, i64), CartError> {
        let in_amount = line_amount(in_unit_minor, in_units).ok_or(CartError::Overflow)?;

        let total_quantity = self
            .total_quantity
            .checked_sub(out_quantity)
            .and_then(|total| total.checked_add(in_quantity))
            .ok_or(CartError::Overflow)?;

        let total_amount = self
            .total_amount
            .checked_sub(out_amount)
            .and_then(|total| total.checked_add(in_amount))
            .ok_or(CartError::Overflow)?;

        Ok((total_quantity, total_amount))
    }
}

fn validate_quantity(quantity: u32) -> Result<u32, CartError> {
    if quantity == 0 {
        return Err(CartError::InvalidQuantity(quantity));
    }

    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use crate::pricing::total_price;

    use super::*;

    fn shirt(size: &str, price: i64, quantity: u32) -> LineItem {
        LineItem::new("P1", "Linen shirt", Money::from_minor(price, iso::GBP), quantity)
            .with_size(size)
    }

    fn assert_totals_match(cart: &Cart) -> TestResult {
        let quantity: u64 = cart.iter().map(|item| u64::from(item.quantity())).sum();

        assert_eq!(cart.total_quantity(), quantity, "total quantity drifted");
        assert_eq!(
            cart.total_amount(),
            total_price(cart.items(), cart.currency())?,
            "total amount drifted"
        );

        Ok(())
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = Cart::new(iso::GBP);

        assert!(cart.is_empty());
        assert_eq!(cart.total_quantity(), 0);
        assert_eq!(cart.total_amount(), Money::from_minor(0, iso::GBP));
        assert_eq!(cart.currency(), iso::GBP);
    }

    #[test]
    fn add_item_appends_new_lines_in_order() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_item(shirt("M", 100, 1))?;
        cart.add_item(shirt("S", 100, 2))?;

        let sizes: Vec<_> = cart.iter().map(LineItem::size).collect();

        assert_eq!(sizes, [Some("M"), Some("S")]);
        assert_eq!(cart.total_quantity(), 3);
        assert_totals_match(&cart)
    }

    #[test]
    fn add_item_merges_and_keeps_first_price() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_item(shirt("M", 100, 2))?;
        cart.add_item(
            LineItem::new("P1", "Renamed shirt", Money::from_minor(999, iso::GBP), 1)
                .with_size("M")
                .with_image("/other.jpg"),
        )?;

        let key = LineItemKey::new("P1", Some("M"), None);
        let line = cart.get(&key).ok_or("missing line")?;

        assert_eq!(cart.len(), 1);
        assert_eq!(line.quantity(), 3);
        assert_eq!(line.unit_price(), &Money::from_minor(100, iso::GBP));
        assert_eq!(line.name(), "Linen shirt");
        assert_eq!(line.image(), None);
        assert_eq!(cart.total_amount(), Money::from_minor(300, iso::GBP));
        assert_totals_match(&cart)
    }

    #[test]
    fn add_item_rejects_zero_quantity() {
        let mut cart = Cart::new(iso::GBP);

        assert_eq!(
            cart.add_item(shirt("M", 100, 0)),
            Err(CartError::InvalidQuantity(0))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn add_item_rejects_negative_price() {
        let mut cart = Cart::new(iso::GBP);

        assert_eq!(
            cart.add_item(shirt("M", -5, 1)),
            Err(CartError::NegativePrice(-5))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn add_item_rejects_other_currency() {
        let mut cart = Cart::new(iso::GBP);
        let item = LineItem::new("P1", "Shirt", Money::from_minor(100, iso::USD), 1);

        assert_eq!(
            cart.add_item(item),
            Err(CartError::CurrencyMismatch(
                iso::USD.iso_alpha_code,
                iso::GBP.iso_alpha_code
            ))
        );
    }

    #[test]
    fn add_item_overflow_leaves_cart_untouched() -> TestResult {
        let mut cart = Cart::new(iso::GBP);

        cart.add_item(shirt("M", i64::MAX / 2, 1))?;
        let before = cart.clone();

        assert_eq!(cart.add_item(shirt("L", i64::MAX / 2, 4)), Err(CartError::Overflow));
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn remove_item_subtracts_line() -> TestResult {
        let mut cart = Cart::with_items([shirt("M", 100, 2), shirt("L", 150, 1)], iso::GBP)?;

        let removed = cart.remove_item(&LineItemKey::new("P1", Some("M"), None));

        assert_eq!(removed.as_ref().map(LineItem::quantity), Some(2));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_quantity(), 1);
        assert_eq!(cart.total_amount(), Money::from_minor(150, iso::GBP));
        assert_totals_match(&cart)
    }

    #[test]
    fn remove_missing_item_is_noop() -> TestResult {
        let mut cart = Cart::with_items([shirt("M", 100, 2)], iso::GBP)?;
        let before = cart.clone();

        assert!(
            cart.remove_item(&LineItemKey::new("P1", Some("M"), Some("red")))
                .is_none()
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn update_quantity_adjusts_by_delta() -> TestResult {
        let mut cart = Cart::with_items([shirt("M", 100, 2), shirt("L", 150, 1)], iso::GBP)?;
        let key = LineItemKey::new("P1", Some("M"), None);

        assert!(cart.update_quantity(&key, 5)?);
        assert_eq!(cart.total_quantity(), 6);
        assert_eq!(cart.total_amount(), Money::from_minor(650, iso::GBP));

        assert!(cart.update_quantity(&key, 1)?);
        assert_eq!(cart.total_amount(), Money::from_minor(250, iso::GBP));
        assert_totals_match(&cart)
    }

    #[test]
    fn update_quantity_rejects_zero() -> TestResult {
        let mut cart = Cart::with_items([shirt("M", 100, 2)], iso::GBP)?;
        let key = LineItemKey::new("P1", Some("M"), None);

        assert_eq!(
            cart.update_quantity(&key, 0),
            Err(CartError::InvalidQuantity(0))
        );
        assert_eq!(cart.total_quantity(), 2);

        Ok(())
    }

    #[test]
    fn update_missing_item_is_noop() -> TestResult {
        let mut cart = Cart::with_items([shirt("M", 100, 2)], iso::GBP)?;
        let before = cart.clone();

        assert!(!cart.update_quantity(&LineItemKey::new("P2", None, None), 4)?);
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn decrement_stops_at_one() -> TestResult {
        let mut cart = Cart::with_items([shirt("M", 100, 2)], iso::GBP)?;
        let key = LineItemKey::new("P1", Some("M"), None);

        assert_eq!(cart.decrement(&key)?, Some(1));
        assert_eq!(cart.decrement(&key)?, Some(1));
        assert_eq!(cart.total_quantity(), 1);
        assert_eq!(cart.increment(&key)?, Some(2));
        assert_eq!(cart.increment(&LineItemKey::new("P2", None, None))?, None);
        assert_totals_match(&cart)
    }

    #[test]
    fn set_quantity_clamped_raises_low_values_to_one() -> TestResult {
        let mut cart = Cart::with_items([shirt("M", 100, 4)], iso::GBP)?;
        let key = LineItemKey::new("P1", Some("M"), None);

        assert!(cart.set_quantity_clamped(&key, -3)?);
        assert_eq!(cart.get(&key).map(LineItem::quantity), Some(1));
        assert_eq!(cart.total_amount(), Money::from_minor(100, iso::GBP));

        Ok(())
    }

    #[test]
    fn clamp_quantity_bounds() {
        assert_eq!(clamp_quantity(-7), 1);
        assert_eq!(clamp_quantity(0), 1);
        assert_eq!(clamp_quantity(12), 12);
        assert_eq!(clamp_quantity(i64::MAX), u32::MAX);
    }
}
