use std::io;

use clap::Args;

use crate::{
    cart::CartChange,
    config::Config,
    items::{DEFAULT_COLOR, DEFAULT_SIZE, LineItemKey},
    pricing::format_rupees,
    receipt::CartReceipt,
    storage::FileStorage,
    store::CartStore,
};

use super::{CliError, require_catalog};

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    /// Product identifier
    id: String,

    /// Size (defaults to M)
    #[arg(long, short)]
    size: Option<String>,

    /// Colour (defaults to Black)
    #[arg(long, short)]
    color: Option<String>,

    /// Quantity to add; negative values decrease
    #[arg(long, short, default_value_t = 1, allow_negative_numbers = true)]
    quantity: i64,
}

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    /// Product identifier
    id: String,

    /// Size
    #[arg(long, short, default_value = DEFAULT_SIZE)]
    size: String,

    /// Colour
    #[arg(long, short, default_value = DEFAULT_COLOR)]
    color: String,
}

pub(super) fn open_store(config: &Config) -> CartStore<FileStorage> {
    CartStore::with_policy(config.storage.storage(), config.pricing.policy())
}

pub(super) fn list(config: &Config, out: &mut impl io::Write) -> Result<(), CliError> {
    let store = open_store(config);

    CartReceipt::new(store.items(), store.policy())?.write_to(out)?;

    Ok(())
}

pub(super) fn add(
    config: &Config,
    args: &AddArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let catalog = require_catalog(config)?;
    let product = catalog.find(&args.id)?;
    let item = product.line_item(args.size.as_deref(), args.color.as_deref(), args.quantity)?;
    let key = item.key();

    let mut store = open_store(config);

    match store.add_to_cart(item) {
        CartChange::Inserted => writeln!(out, "Added {key}")?,
        CartChange::Updated { quantity } => writeln!(out, "Updated {key}: quantity {quantity}")?,
        CartChange::Removed => writeln!(out, "Removed {key}")?,
        CartChange::Ignored => writeln!(out, "{key} is not in the cart")?,
    }

    report_items(&store, out)
}

pub(super) fn remove(
    config: &Config,
    args: &RemoveArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let mut store = open_store(config);

    let product_id = store
        .items()
        .iter()
        .find(|item| {
            item.product_id().matches(&args.id)
                && item.selected_size() == args.size
                && item.selected_color() == args.color
        })
        .map(|item| item.product_id().clone())
        .ok_or_else(|| {
            CliError::NotInCart(format!("{} ({}, {})", args.id, args.size, args.color))
        })?;

    store.remove_from_cart(&product_id, &args.size, &args.color);

    writeln!(
        out,
        "Removed {}",
        LineItemKey::new(product_id, args.size.clone(), args.color.clone())
    )?;

    report_items(&store, out)
}

pub(super) fn clear(config: &Config, out: &mut impl io::Write) -> Result<(), CliError> {
    let mut store = open_store(config);
    let removed = store.clear_cart();

    writeln!(out, "Removed {removed} entries")?;

    report_items(&store, out)
}

pub(super) fn summary(config: &Config, out: &mut impl io::Write) -> Result<(), CliError> {
    let store = open_store(config);
    let prices = store.price_breakdown()?;

    writeln!(out, "items: {}", store.total_items())?;
    writeln!(out, "subtotal: {}", format_rupees(prices.subtotal)?)?;
    writeln!(out, "discount: {}", format_rupees(prices.discount)?)?;
    writeln!(out, "delivery: {}", format_rupees(prices.delivery_charge)?)?;
    writeln!(out, "total: {}", format_rupees(prices.total)?)?;

    Ok(())
}

fn report_items(store: &CartStore<FileStorage>, out: &mut impl io::Write) -> Result<(), CliError> {
    if !store.is_persisted() {
        writeln!(out, "warning: the cart could not be saved")?;
    }

    writeln!(out, "Cart: {} item(s)", store.total_items())?;

    Ok(())
}
