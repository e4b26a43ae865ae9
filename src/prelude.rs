//! BOLT FIT prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartChange},
    catalog::{Catalog, CatalogError, Product, ProductColor, ProductKey, ProductSize},
    customers::{
        CustomerDetails, CustomerProfile, Field, FieldError, ProfileError, ValidationErrors,
    },
    items::{CartLineItem, LineItemKey, ProductId},
    orders::{OrderError, OrderKind, OrderSummary},
    pricing::{PriceBreakdown, PricingError, PricingPolicy},
    receipt::{CartReceipt, ReceiptError},
    storage::{FileStorage, MemoryStorage, Storage, StorageError},
    store::{CartStore, PersistError},
};
