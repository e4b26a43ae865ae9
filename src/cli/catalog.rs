use std::io;

use clap::{Args, Subcommand};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{
    catalog::Product,
    config::Config,
    pricing::{PricingError, format_rupees},
};

use super::{CliError, require_catalog};

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List products available for sale
    List {
        /// Only featured products
        #[arg(long)]
        featured: bool,

        /// Only products in this category
        #[arg(long)]
        category: Option<String>,
    },
}

pub(super) fn run(
    config: &Config,
    command: &CatalogCommand,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let catalog = require_catalog(config)?;

    match &command.command {
        CatalogSubcommand::List { featured, category } => {
            let products = catalog.active().filter(|product| {
                (!featured || product.is_featured)
                    && category
                        .as_deref()
                        .is_none_or(|wanted| product.category.eq_ignore_ascii_case(wanted))
            });

            writeln!(out, "{}", product_table(products)?)?;
        }
    }

    Ok(())
}

fn product_table<'a>(
    products: impl Iterator<Item = &'a Product>,
) -> Result<String, PricingError> {
    let mut builder = Builder::default();

    builder.push_record(["ID", "Name", "Category", "Price", "MRP", "Off", "Sizes"]);

    for product in products {
        let sizes = product
            .sizes
            .iter()
            .map(|size| size.size.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        builder.push_record([
            product.id.to_string(),
            product.title.clone(),
            product.category.clone(),
            format_rupees(product.price)?,
            product
                .original_price
                .map(format_rupees)
                .transpose()?
                .unwrap_or_default(),
            format!("{}%", product.discount_percentage()),
            sizes,
        ]);
    }

    let mut table = builder.build();

    table.with(Style::rounded());
    table.modify(Columns::new(3..6), Alignment::right());

    Ok(table.to_string())
}
