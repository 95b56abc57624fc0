//! Pricing

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Findable, Money, iso::Currency};
use thiserror::Error;

use crate::items::LineItem;

/// Money amount in a fixed ISO currency.
pub type Price = Money<'static, Currency>;

/// Errors that can occur while parsing or summing prices.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// The price string was not in the form `AMOUNT CURRENCY`.
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// The currency code is not a known ISO currency.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// An item's currency differs from the expected currency (index, item currency, expected currency).
    #[error("Item {0} has currency {1}, but expected {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// The sum does not fit in minor units.
    #[error("Total overflows minor units")]
    Overflow,
}

/// Minor-unit amount of `quantity` units at `unit_minor`, or `None` on overflow.
pub fn line_amount(unit_minor: i64, quantity: u32) -> Option<i64> {
    unit_minor.checked_mul(i64::from(quantity))
}

/// Calculates the total price of a list of line items.
///
/// An empty list totals to zero in `currency`.
///
/// # Errors
///
/// - [`PriceError::CurrencyMismatch`]: An item is priced in another currency.
/// - [`PriceError::Overflow`]: The total does not fit in minor units.
pub fn total_price(items: &[LineItem], currency: &'static Currency) -> Result<Price, PriceError> {
    let total = items
        .iter()
        .enumerate()
        .try_fold(0_i64, |acc, (i, item)| {
            let item_currency = item.unit_price().currency();

            if item_currency != currency {
                return Err(PriceError::CurrencyMismatch(
                    i,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            line_amount(item.unit_price().to_minor_units(), item.quantity())
                .and_then(|amount| acc.checked_add(amount))
                .ok_or(PriceError::Overflow)
        })?;

    Ok(Money::from_minor(total, currency))
}

/// Look up an ISO currency by its alphabetic code.
///
/// # Errors
///
/// Returns [`PriceError::UnknownCurrency`] if the code is not recognised.
pub fn find_currency(code: &str) -> Result<&'static Currency, PriceError> {
    Currency::find(code).ok_or_else(|| PriceError::UnknownCurrency(code.to_string()))
}

/// Parse a price string (e.g. `"2.99 GBP"` or `"199000 VND"`) into a [`Price`].
///
/// The amount is scaled by the currency's exponent and must land on a whole
/// number of minor units.
///
/// # Errors
///
/// Returns an error if the string is not in the format `AMOUNT CURRENCY`, if
/// the amount is not an exact decimal in the currency's minor units, or if
/// the currency code is not recognised.
pub fn parse_price(s: &str) -> Result<Price, PriceError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PriceError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = find_currency(code)?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| PriceError::InvalidPrice(s.to_string()))?;

    let scale = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or_else(|| PriceError::InvalidPrice(s.to_string()))?;

    let minor = amount
        .checked_mul(scale)
        .filter(|value| value.fract().is_zero())
        .and_then(|value| value.to_i64())
        .ok_or_else(|| PriceError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor, currency))
}
