//! BOLT FIT
//!
//! Cart, pricing and checkout for the BOLT FIT clothing store. The cart keys entries by product,
//! size and colour, derives discount and delivery charges from its contents, and persists itself
//! to a key-value store after every change.

pub mod cart;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod customers;
pub mod items;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod storage;
pub mod store;
