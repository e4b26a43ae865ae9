//! Orders
//!
//! Checkout hands an order to the store's messaging channel as a pre-filled chat message.
//! An order is either the whole cart or a single item bought directly from a product page.

use std::fmt::{self, Write};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    cart::Cart,
    customers::{CustomerDetails, ValidationErrors},
    items::CartLineItem,
    pricing::{PriceBreakdown, PricingError, PricingPolicy, format_rupees},
};

/// Number that receives order messages.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "918778146987";

/// Errors that can occur while preparing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// There is nothing to order.
    #[error("cannot place an order for an empty cart")]
    EmptyCart,

    /// A direct purchase asked for less than one unit.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// The customer's details are incomplete or malformed.
    #[error(transparent)]
    Customer(#[from] ValidationErrors),

    /// Derived prices could not be computed or displayed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The message text could not be written.
    #[error("failed to write the order message")]
    Format(#[from] fmt::Error),
}

/// Where the order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// Every item in the cart.
    Cart,

    /// A single item bought from its product page.
    Direct,
}

/// An order ready to hand off.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    kind: OrderKind,
    items: Vec<CartLineItem>,
    prices: PriceBreakdown,
    discount_percent: Decimal,
    customer: CustomerDetails,
}

impl OrderSummary {
    /// Builds an order for the whole cart, priced with `policy`.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: the cart has no items.
    /// - [`OrderError::Customer`]: the customer's details are invalid.
    /// - [`OrderError::Pricing`]: the totals could not be derived.
    pub fn from_cart(
        cart: &Cart,
        policy: &PricingPolicy,
        customer: CustomerDetails,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        customer.validate()?;

        Ok(Self {
            kind: OrderKind::Cart,
            items: cart.items().to_vec(),
            prices: policy.breakdown(cart.items())?,
            discount_percent: policy.discount_percent_points(),
            customer,
        })
    }

    /// Builds an order for a single item bought directly.
    ///
    /// # Errors
    ///
    /// - [`OrderError::InvalidQuantity`]: the quantity is below one.
    /// - [`OrderError::Customer`]: the customer's details are invalid.
    /// - [`OrderError::Pricing`]: the total could not be derived.
    pub fn direct(item: CartLineItem, customer: CustomerDetails) -> Result<Self, OrderError> {
        if item.quantity() < 1 {
            return Err(OrderError::InvalidQuantity(item.quantity()));
        }

        customer.validate()?;

        Ok(Self {
            kind: OrderKind::Direct,
            prices: PriceBreakdown::direct_purchase(&item)?,
            items: vec![item],
            discount_percent: Decimal::ZERO,
            customer,
        })
    }

    /// Where the order came from.
    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    /// Ordered items.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Derived prices.
    pub fn prices(&self) -> &PriceBreakdown {
        &self.prices
    }

    /// Customer the order is for.
    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    /// Plain-text message body.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be displayed.
    pub fn message(&self) -> Result<String, OrderError> {
        let mut message = String::new();

        match self.kind {
            OrderKind::Cart => self.write_cart(&mut message)?,
            OrderKind::Direct => self.write_direct(&mut message)?,
        }

        Ok(message)
    }

    /// Chat deep link that opens a conversation with `number` pre-filled with the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built.
    pub fn handoff_url(&self, number: &str) -> Result<String, OrderError> {
        Ok(format!(
            "https://wa.me/{number}?text={}",
            encode_uri_component(&self.message()?)
        ))
    }

    fn write_cart(&self, out: &mut String) -> Result<(), OrderError> {
        let count = self.items.len();
        let plural = if count > 1 { "S" } else { "" };

        writeln!(out, "*NEW ORDER - {count} ITEM{plural}*")?;
        writeln!(out)?;
        writeln!(out, "*ORDER ITEMS:*")?;

        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                writeln!(out)?;
            }

            writeln!(out, "{}. {}", idx + 1, item.title())?;
            writeln!(
                out,
                "   • Size: {} | Color: {}",
                item.selected_size(),
                item.selected_color()
            )?;
            writeln!(
                out,
                "   • Qty: {} | Price: ₹{} each",
                item.quantity(),
                item.price()
            )?;
            writeln!(out, "   • Subtotal: ₹{}", item.line_total().unwrap_or_default())?;
            writeln!(out, "   • Image: {}", item.image())?;
        }

        let prices = &self.prices;

        writeln!(out)?;
        writeln!(out, "*PRICE BREAKDOWN:*")?;
        writeln!(out, "• Subtotal: {}", format_rupees(prices.subtotal)?)?;
        writeln!(
            out,
            "• Discount ({}%): −{}",
            self.discount_percent,
            format_rupees(prices.discount)?
        )?;

        if prices.is_free_delivery() {
            writeln!(out, "• Delivery: FREE")?;
        } else {
            writeln!(out, "• Delivery: {}", format_rupees(prices.delivery_charge)?)?;
        }

        writeln!(out, "• *TOTAL AMOUNT: {}*", format_rupees(prices.total)?)?;
        writeln!(out)?;

        self.write_customer(out, "*CUSTOMER DETAILS:*", "*DELIVERY ADDRESS:*")?;

        if let Some(info) = self.additional_info() {
            writeln!(out)?;
            writeln!(out, "*ADDITIONAL INFO:*")?;
            writeln!(out, "{info}")?;
        }

        writeln!(out)?;
        write!(out, "Please confirm this order. Thank you!")?;

        Ok(())
    }

    fn write_direct(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "*New Order Details*")?;
        writeln!(out)?;
        writeln!(out, "*Product Information:*")?;

        for item in &self.items {
            writeln!(out, "• Product: {}", item.title())?;
            writeln!(out, "• Price: ₹{}", item.price())?;
            writeln!(out, "• Size: {}", item.selected_size())?;
            writeln!(out, "• Color: {}", item.selected_color())?;
            writeln!(out, "• Quantity: {}", item.quantity())?;
            writeln!(out, "• Total: ₹{}", self.prices.total)?;
            writeln!(out)?;
            writeln!(out, "*Product Image:*")?;
            writeln!(out, "{}", item.image())?;
        }

        writeln!(out)?;

        self.write_customer(out, "*Customer Details:*", "*Delivery Address:*")?;

        if let Some(info) = self.additional_info() {
            writeln!(out)?;
            writeln!(out, "*Additional Info:*")?;
            writeln!(out, "{info}")?;
        }

        writeln!(out)?;
        write!(out, "Please confirm this order. Thank you!")
    }

    fn write_customer(
        &self,
        out: &mut String,
        details_heading: &str,
        address_heading: &str,
    ) -> fmt::Result {
        let customer = &self.customer;

        writeln!(out, "{details_heading}")?;
        writeln!(out, "• Name: {}", customer.name)?;
        writeln!(out, "• Phone: {}", customer.phone)?;
        writeln!(out, "• Email: {}", customer.email)?;
        writeln!(out)?;
        writeln!(out, "{address_heading}")?;
        writeln!(out, "{}", customer.address)?;
        writeln!(out, "{}, {}", customer.city, customer.state)?;
        writeln!(out, "Pincode: {}", customer.pincode)
    }

    fn additional_info(&self) -> Option<&str> {
        self.customer
            .additional_info
            .as_deref()
            .map(str::trim)
            .filter(|info| !info.is_empty())
    }
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(input: &str) -> String {
    let mut encoded = String::with_capacity(input.len());

    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            _ = write!(encoded, "%{byte:02X}");
        }
    }

    encoded
}
