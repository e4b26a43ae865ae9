use std::io;

use clap::Args;

use crate::{
    config::Config,
    customers::{CustomerDetails, CustomerProfile},
    orders::OrderSummary,
};

use super::{CliError, cart::open_store, require_catalog};

/// Customer fields. Omitted ones fall back to the saved details.
#[derive(Debug, Args)]
pub(crate) struct CustomerArgs {
    /// Full name
    #[arg(long)]
    name: Option<String>,

    /// Ten digit phone number
    #[arg(long)]
    phone: Option<String>,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// Street address
    #[arg(long)]
    address: Option<String>,

    /// City
    #[arg(long)]
    city: Option<String>,

    /// Six digit pincode
    #[arg(long)]
    pincode: Option<String>,

    /// State
    #[arg(long)]
    state: Option<String>,

    /// Delivery notes for this order
    #[arg(long)]
    notes: Option<String>,
}

impl CustomerArgs {
    fn into_details(self) -> CustomerDetails {
        CustomerDetails {
            name: self.name.unwrap_or_default(),
            phone: self.phone.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            pincode: self.pincode.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            additional_info: self.notes.filter(|notes| !notes.trim().is_empty()),
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    #[command(flatten)]
    customer: CustomerArgs,
}

#[derive(Debug, Args)]
pub(crate) struct BuyArgs {
    /// Product identifier
    id: String,

    /// Size (defaults to M)
    #[arg(long, short)]
    size: Option<String>,

    /// Colour (defaults to Black)
    #[arg(long, short)]
    color: Option<String>,

    /// Quantity
    #[arg(long, short, default_value_t = 1)]
    quantity: i64,

    #[command(flatten)]
    customer: CustomerArgs,
}

pub(super) fn checkout(
    config: &Config,
    args: CheckoutArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let mut profile = CustomerProfile::load(config.storage.storage());
    let details = profile.details().clone().merged_with(args.customer.into_details());

    let mut store = open_store(config);
    let order = OrderSummary::from_cart(store.cart(), store.policy(), details.clone())?;

    profile.save(details)?;
    write_order(config, &order, out)?;

    store.clear_cart();

    Ok(())
}

pub(super) fn buy(
    config: &Config,
    args: BuyArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let catalog = require_catalog(config)?;
    let product = catalog.find(&args.id)?;
    let item = product.line_item(args.size.as_deref(), args.color.as_deref(), args.quantity)?;

    let mut profile = CustomerProfile::load(config.storage.storage());
    let details = profile.details().clone().merged_with(args.customer.into_details());

    let order = OrderSummary::direct(item, details.clone())?;

    profile.save(details)?;
    write_order(config, &order, out)
}

fn write_order(
    config: &Config,
    order: &OrderSummary,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    writeln!(out, "{}", order.message()?)?;
    writeln!(out)?;
    writeln!(out, "{}", order.handoff_url(&config.checkout.whatsapp_number)?)?;

    Ok(())
}
