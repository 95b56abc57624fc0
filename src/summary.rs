//! Cart Summary

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, items::LineItem};

/// Errors rendering a cart summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A line total does not fit in minor units.
    #[error("Line total overflows for {0}")]
    LineTotal(String),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Write the cart as a table of lines followed by its totals.
///
/// # Errors
///
/// Returns a [`SummaryError`] if a line total overflows or the output cannot be written.
pub fn write_summary(mut out: impl io::Write, cart: &Cart) -> Result<(), SummaryError> {
    if cart.is_empty() {
        return writeln!(out, "\n Your cart is empty.\n").map_err(|_err| SummaryError::IO);
    }

    let mut builder = Builder::default();

    builder.push_record(["Item", "Variant", "Unit Price", "Qty", "Line Total"]);

    for item in cart.iter() {
        let line_total = item
            .line_total()
            .ok_or_else(|| SummaryError::LineTotal(item.key().to_string()))?;

        builder.push_record([
            item.name().to_string(),
            variant_label(item),
            item.unit_price().to_string(),
            item.quantity().to_string(),
            line_total.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..5), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    writeln!(out, "\n{table}").map_err(|_err| SummaryError::IO)?;

    writeln!(
        out,
        " Subtotal ({} items): {}\n Total: {}\n",
        cart.total_quantity(),
        cart.total_amount(),
        cart.total_amount()
    )
    .map_err(|_err| SummaryError::IO)
}

fn variant_label(item: &LineItem) -> String {
    match (item.size(), item.color()) {
        (Some(size), Some(color)) => format!("{size} / {color}"),
        (Some(size), None) => size.to_string(),
        (None, Some(color)) => color.to_string(),
        (None, None) => "-".to_string(),
    }
}
