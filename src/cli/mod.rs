//! Command line interface

use std::io;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    config::Config,
    customers::ProfileError,
    orders::OrderError,
    pricing::PricingError,
    receipt::ReceiptError,
};

mod cart;
mod catalog;
mod checkout;
mod customer;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A command needs the product catalogue but none is configured.
    #[error("no product catalogue configured; pass --catalog or set BOLTFIT_CATALOG")]
    NoCatalog,

    /// No cart entry matches the requested product variant.
    #[error("not in cart: {0}")]
    NotInCart(String),

    /// Catalogue error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Order error
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Customer profile error
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Pricing error
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Receipt error
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// BOLT FIT cart and checkout
#[derive(Debug, Parser)]
#[command(name = "boltfit", about = "BOLT FIT cart and checkout", long_about = None)]
pub struct Cli {
    /// Runtime settings.
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the cart
    List,

    /// Add a product to the cart, or change its quantity with a negative value
    Add(cart::AddArgs),

    /// Remove a product variant from the cart
    Remove(cart::RemoveArgs),

    /// Empty the cart
    Clear,

    /// Print cart totals
    Summary,

    /// Order everything in the cart
    Checkout(checkout::CheckoutArgs),

    /// Order a single product without touching the cart
    Buy(checkout::BuyArgs),

    /// Manage saved customer details
    Customer(customer::CustomerCommand),

    /// Browse the product catalogue
    Catalog(catalog::CatalogCommand),
}

impl Cli {
    /// Runs the selected command, writing its output to `out`.
    ///
    /// # Errors
    ///
    /// Returns a [`CliError`] describing the first failure.
    pub fn run(self, out: &mut impl io::Write) -> Result<(), CliError> {
        let config = &self.config;

        match self.command {
            Commands::List => cart::list(config, out),
            Commands::Add(args) => cart::add(config, &args, out),
            Commands::Remove(args) => cart::remove(config, &args, out),
            Commands::Clear => cart::clear(config, out),
            Commands::Summary => cart::summary(config, out),
            Commands::Checkout(args) => checkout::checkout(config, args, out),
            Commands::Buy(args) => checkout::buy(config, args, out),
            Commands::Customer(command) => customer::run(config, &command, out),
            Commands::Catalog(command) => catalog::run(config, &command, out),
        }
    }
}

fn require_catalog(config: &Config) -> Result<Catalog, CliError> {
    config.storage.load_catalog()?.ok_or(CliError::NoCatalog)
}
