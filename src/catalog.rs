//! Catalog
//!
//! Read-only product catalogue. Product pages use it to turn a shopper's size and colour choice
//! into a [`CartLineItem`]; the cart itself never consults it.

use std::{fs, path::Path};

use rust_decimal::{Decimal, RoundingStrategy, prelude::FromPrimitive};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::items::{CartLineItem, DEFAULT_COLOR, DEFAULT_SIZE, ProductId};

/// Brand applied to products that do not name one.
pub const DEFAULT_BRAND: &str = "BOLT FIT";

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Catalogue errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalogue file
    #[error("Failed to read catalogue file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Two products share an identifier
    #[error("Duplicate product: {0}")]
    DuplicateProduct(ProductId),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The product is not offered in the requested size
    #[error("Product {product} is not available in size {size}")]
    SizeNotOffered {
        /// Product identifier
        product: ProductId,
        /// Requested size
        size: String,
    },

    /// The product is not offered in the requested colour
    #[error("Product {product} is not available in colour {color}")]
    ColorNotOffered {
        /// Product identifier
        product: ProductId,
        /// Requested colour
        color: String,
    },

    /// The product is no longer sold
    #[error("Product {0} is not active")]
    Inactive(ProductId),
}

/// A size a product is offered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSize {
    /// Size label (XS, S, M, L, XL, XXL)
    pub size: String,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,
}

/// A colour a product is offered in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductColor {
    /// Colour name
    pub name: String,

    /// Swatch colour; derived from the name when absent
    #[serde(default)]
    pub hex_code: Option<String>,
}

impl ProductColor {
    /// Swatch colour as `#RRGGBB`.
    pub fn hex_code(&self) -> &str {
        self.hex_code
            .as_deref()
            .unwrap_or_else(|| color_hex(&self.name))
    }
}

/// Swatch for a named colour; unknown names render black.
pub fn color_hex(name: &str) -> &'static str {
    match name.trim().to_ascii_lowercase().as_str() {
        "red" => "#FF0000",
        "blue" => "#0000FF",
        "green" => "#008000",
        "white" => "#FFFFFF",
        "gray" | "grey" => "#808080",
        "yellow" => "#FFFF00",
        "orange" => "#FFA500",
        "purple" => "#800080",
        "pink" => "#FFC0CB",
        "brown" => "#A52A2A",
        "navy" => "#000080",
        _ => "#000000",
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Display name
    #[serde(alias = "name")]
    pub title: String,

    /// Long description
    #[serde(default)]
    pub description: String,

    /// Selling price in rupees
    pub price: u64,

    /// Price before markdown, if any
    #[serde(default)]
    pub original_price: Option<u64>,

    /// Category (Shirts, Pants, T-Shirts, Trending)
    #[serde(default)]
    pub category: String,

    /// Image references; the first is the primary image
    #[serde(default)]
    pub images: Vec<String>,

    /// Offered sizes
    #[serde(default)]
    pub sizes: Vec<ProductSize>,

    /// Offered colours
    #[serde(default)]
    pub colors: Vec<ProductColor>,

    /// Fabric
    #[serde(default)]
    pub material: Option<String>,

    /// Brand
    #[serde(default = "default_brand")]
    pub brand: String,

    /// Shown on the landing page
    #[serde(default)]
    pub is_featured: bool,

    /// Available for sale
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_brand() -> String {
    DEFAULT_BRAND.to_string()
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Markdown from the original price in percent points, to two decimal places.
    ///
    /// Zero when there is no original price or it is not above the selling price.
    pub fn discount_percentage(&self) -> Decimal {
        let Some(original) = self.original_price.filter(|original| *original > self.price) else {
            return Decimal::ZERO;
        };

        let (Some(original), Some(price)) =
            (Decimal::from_u64(original), Decimal::from_u64(self.price))
        else {
            return Decimal::ZERO;
        };

        ((original - price) / original * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Returns `true` if the product lists `size`, or lists no sizes at all.
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.is_empty() || self.sizes.iter().any(|s| s.size == size)
    }

    /// Returns `true` if the product lists `color`, or lists no colours at all.
    pub fn offers_color(&self, color: &str) -> bool {
        self.colors.is_empty() || self.colors.iter().any(|c| c.name == color)
    }

    /// Primary image, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Builds a cart line item for a chosen variant.
    ///
    /// Size and colour default to `M` and `Black`. `quantity` is passed through unchanged so
    /// that callers can also build decrement deltas.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is inactive or the variant is not offered.
    pub fn line_item(
        &self,
        size: Option<&str>,
        color: Option<&str>,
        quantity: i64,
    ) -> Result<CartLineItem, CatalogError> {
        if !self.is_active {
            return Err(CatalogError::Inactive(self.id.clone()));
        }

        let size = size.unwrap_or(DEFAULT_SIZE);
        let color = color.unwrap_or(DEFAULT_COLOR);

        if !self.offers_size(size) {
            return Err(CatalogError::SizeNotOffered {
                product: self.id.clone(),
                size: size.to_string(),
            });
        }

        if !self.offers_color(color) {
            return Err(CatalogError::ColorNotOffered {
                product: self.id.clone(),
                color: color.to_string(),
            });
        }

        Ok(CartLineItem::new(self.id.clone(), self.title.clone(), self.price)
            .with_size(size)
            .with_color(color)
            .with_quantity(quantity)
            .with_image(self.primary_image().unwrap_or_default())
            .with_seller(self.brand.clone()))
    }
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

/// Product catalogue
#[derive(Debug, Default)]
pub struct Catalog {
    products: SlotMap<ProductKey, Product>,
    keys: FxHashMap<ProductId, ProductKey>,
}

impl Catalog {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalogue from YAML with a top-level `products` list.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or two products share an identifier.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_norway::from_str(yaml)?;
        let mut catalog = Self::new();

        for product in file.products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// Load a catalogue from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateProduct`] if the identifier is already present.
    pub fn insert(&mut self, product: Product) -> Result<ProductKey, CatalogError> {
        if self.keys.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.keys.insert(id, key);

        Ok(key)
    }

    /// Look up a product by identifier.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.keys.get(id).and_then(|key| self.products.get(*key))
    }

    /// Look up a product by its rendered identifier, as typed by a user.
    ///
    /// Digits are tried as a numeric identifier first, then as text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no product renders as `raw`.
    pub fn find(&self, raw: &str) -> Result<&Product, CatalogError> {
        raw.parse::<u64>()
            .ok()
            .and_then(|number| self.get(&ProductId::Number(number)))
            .or_else(|| self.get(&ProductId::from(raw)))
            .ok_or_else(|| CatalogError::ProductNotFound(raw.to_string()))
    }

    /// Iterate over all products.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// Iterate over products that are for sale.
    pub fn active(&self) -> impl Iterator<Item = &Product> {
        self.iter().filter(|product| product.is_active)
    }

    /// Iterate over featured products that are for sale.
    pub fn featured(&self) -> impl Iterator<Item = &Product> {
        self.active().filter(|product| product.is_featured)
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
