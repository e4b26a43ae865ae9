//! Items
//!
//! A cart line item is one product variant (size and colour) at a chosen quantity. Only the
//! product identifier, size and colour take part in identity; everything else is carried for
//! display.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Size used when a caller does not pick one.
pub const DEFAULT_SIZE: &str = "M";

/// Colour used when a caller does not pick one.
pub const DEFAULT_COLOR: &str = "Black";

/// Catalogue identity of a product.
///
/// The storefront receives identifiers from a remote catalogue that may hand out either numbers
/// or strings, so both are kept as-is. `Number(7)` and `Text("7")` are different products.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    /// Numeric identifier.
    Number(u64),

    /// Opaque string identifier.
    Text(String),
}

impl ProductId {
    /// Returns `true` if this identifier renders exactly as `raw`.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            ProductId::Number(number) => raw.parse::<u64>().is_ok_and(|n| n == *number),
            ProductId::Text(text) => text == raw,
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(number) => write!(f, "{number}"),
            ProductId::Text(text) => f.write_str(text),
        }
    }
}

/// Parses digits-only input as a numeric identifier, anything else as text.
impl FromStr for ProductId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<u64>()
            .map_or_else(|_err| ProductId::Text(s.to_string()), ProductId::Number))
    }
}

impl From<u64> for ProductId {
    fn from(value: u64) -> Self {
        ProductId::Number(value)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        ProductId::Text(value.to_string())
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        ProductId::Text(value)
    }
}

/// Composite identity of a cart slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineItemKey {
    /// Product identifier
    pub product_id: ProductId,

    /// Selected size
    pub size: String,

    /// Selected colour
    pub color: String,
}

impl LineItemKey {
    /// Creates a key from its three parts.
    pub fn new(product_id: ProductId, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
            color: color.into(),
        }
    }
}

impl fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.product_id, self.size, self.color)
    }
}

/// One product variant in the cart.
///
/// When used as input to [`crate::cart::Cart::apply_delta`] the quantity is a signed delta;
/// once stored in a cart it is always at least one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(rename = "id", alias = "productId")]
    product_id: ProductId,

    #[serde(default)]
    title: String,

    price: u64,

    quantity: i64,

    #[serde(default = "default_size", deserialize_with = "size_or_default")]
    selected_size: String,

    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    selected_color: String,

    #[serde(default)]
    image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    seller: Option<String>,
}

impl CartLineItem {
    /// Creates a single unit of a product in the default size and colour.
    pub fn new(product_id: impl Into<ProductId>, title: impl Into<String>, price: u64) -> Self {
        Self {
            product_id: product_id.into(),
            title: title.into(),
            price,
            quantity: 1,
            selected_size: DEFAULT_SIZE.to_string(),
            selected_color: DEFAULT_COLOR.to_string(),
            image: String::new(),
            seller: None,
        }
    }

    /// Sets the quantity (or signed delta).
    #[must_use]
    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Sets the selected size.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.selected_size = size.into();
        self
    }

    /// Sets the selected colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.selected_color = color.into();
        self
    }

    /// Sets the display image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Sets the seller shown next to the item.
    #[must_use]
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    /// Returns the product identifier
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the unit price in whole rupees
    pub fn price(&self) -> u64 {
        self.price
    }

    /// Returns the quantity
    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Returns the selected size
    pub fn selected_size(&self) -> &str {
        &self.selected_size
    }

    /// Returns the selected colour
    pub fn selected_color(&self) -> &str {
        &self.selected_color
    }

    /// Returns the display image reference
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Returns the seller, if any
    pub fn seller(&self) -> Option<&str> {
        self.seller.as_deref()
    }

    /// Returns the composite identity of this item.
    pub fn key(&self) -> LineItemKey {
        LineItemKey::new(
            self.product_id.clone(),
            self.selected_size.clone(),
            self.selected_color.clone(),
        )
    }

    /// Returns `true` if this item occupies the given cart slot.
    pub fn is_slot(&self, product_id: &ProductId, size: &str, color: &str) -> bool {
        self.product_id == *product_id && self.selected_size == size && self.selected_color == color
    }

    /// Returns `true` if both items occupy the same cart slot.
    pub fn same_slot(&self, other: &CartLineItem) -> bool {
        self.is_slot(&other.product_id, &other.selected_size, &other.selected_color)
    }

    /// Price multiplied by quantity, or `None` on overflow or a non-positive quantity.
    pub fn line_total(&self) -> Option<u64> {
        u64::try_from(self.quantity)
            .ok()
            .and_then(|quantity| self.price.checked_mul(quantity))
    }

    pub(crate) fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }
}

fn default_size() -> String {
    DEFAULT_SIZE.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn size_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_size))
}

fn color_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_color))
}
