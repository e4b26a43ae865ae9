//! Receipt
//!
//! Terminal rendering of a cart and its price breakdown.

use std::io;

use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    items::CartLineItem,
    pricing::{PriceBreakdown, PricingError, PricingPolicy, format_rupees},
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Prices could not be derived or displayed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A cart snapshot with its derived prices.
#[derive(Debug, Clone)]
pub struct CartReceipt<'a> {
    items: &'a [CartLineItem],
    prices: PriceBreakdown,
    discount_percent: Decimal,
    shortfall: u64,
}

impl<'a> CartReceipt<'a> {
    /// Prices `items` with `policy`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the totals cannot be derived.
    pub fn new(items: &'a [CartLineItem], policy: &PricingPolicy) -> Result<Self, PricingError> {
        let prices = policy.breakdown(items)?;

        Ok(Self {
            items,
            prices,
            discount_percent: policy.discount_percent_points(),
            shortfall: policy.shortfall_for_free_delivery(prices.subtotal),
        })
    }

    /// Writes the item table followed by the price summary.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be displayed or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        if self.items.is_empty() {
            return writeln!(out, "Your cart is empty.").map_err(|_err| ReceiptError::IO);
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Size", "Colour", "Qty", "Price", "Line Total"]);

        for (idx, item) in self.items.iter().enumerate() {
            let line_total = item.line_total().ok_or(PricingError::Overflow)?;

            builder.push_record([
                format!("#{:<3}", idx + 1),
                item.title().to_string(),
                item.selected_size().to_string(),
                item.selected_color().to_string(),
                item.quantity().to_string(),
                format_rupees(item.price())?,
                format_rupees(line_total)?,
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(4..7), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let prices = &self.prices;

        let delivery = if prices.is_free_delivery() {
            "FREE".to_string()
        } else {
            format_rupees(prices.delivery_charge)?
        };

        let rows = [
            ("Subtotal:".to_string(), format_rupees(prices.subtotal)?),
            (
                format!("Discount ({}%):", self.discount_percent),
                format!("-{}", format_rupees(prices.discount)?),
            ),
            ("Delivery:".to_string(), delivery),
            ("Total:".to_string(), format_rupees(prices.total)?),
        ];

        let label_width = rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or_default();

        let value_width = rows
            .iter()
            .map(|(_, value)| value.chars().count())
            .max()
            .unwrap_or_default();

        for (idx, (label, value)) in rows.iter().enumerate() {
            let line = format!(" {label:>label_width$}  {value:>value_width$}");

            let written = if idx + 1 == rows.len() {
                writeln!(out, "\x1b[1m{line}\x1b[0m")
            } else {
                writeln!(out, "{line}")
            };

            written.map_err(|_err| ReceiptError::IO)?;
        }

        if self.shortfall > 0 {
            writeln!(
                out,
                "\nAdd {} more for free delivery.",
                format_rupees(self.shortfall)?
            )
            .map_err(|_err| ReceiptError::IO)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}
