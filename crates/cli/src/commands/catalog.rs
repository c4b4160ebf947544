//! `catalog`: list products with the storefront's filters and sorts.

use std::collections::BTreeSet;
use std::str::FromStr;

use bloomway_core::catalog::{ProductQuery, SortKey};
use bloomway_core::{CategoryId, Price};
use clap::Args;
use rust_decimal::Decimal;

use super::{CommandError, public_client};

#[derive(Debug, Default, Args)]
pub struct CatalogArgs {
    /// Text to find in names and descriptions
    #[arg(short = 'q', long)]
    pub search: Option<String>,

    /// Category id
    #[arg(long)]
    pub category: Option<String>,

    /// Lowest price, inclusive
    #[arg(long)]
    pub min_price: Option<String>,

    /// Highest price, inclusive
    #[arg(long)]
    pub max_price: Option<String>,

    /// City to include; repeat for several
    #[arg(long = "city")]
    pub cities: Vec<String>,

    /// featured, price_asc, price_desc, name_asc or newest
    #[arg(long, default_value = "featured")]
    pub sort: String,
}

fn price(raw: Option<&str>, flag: &str) -> Result<Option<Price>, CommandError> {
    raw.map(|raw| {
        Decimal::from_str(raw.trim())
            .ok()
            .filter(|amount| !amount.is_sign_negative())
            .map(Price::new)
            .ok_or_else(|| CommandError::InvalidArgument(format!("{flag}: {raw}")))
    })
    .transpose()
}

/// Turn the flags into a catalog query.
///
/// # Errors
///
/// Returns `CommandError::InvalidArgument` for a bad price or sort key.
pub fn build_query(args: &CatalogArgs) -> Result<ProductQuery, CommandError> {
    Ok(ProductQuery {
        search: args.search.clone().filter(|s| !s.trim().is_empty()),
        category: args.category.as_deref().map(CategoryId::new),
        min_price: price(args.min_price.as_deref(), "--min-price")?,
        max_price: price(args.max_price.as_deref(), "--max-price")?,
        cities: args.cities.iter().cloned().collect::<BTreeSet<_>>(),
        sort: SortKey::from_str(&args.sort).map_err(CommandError::InvalidArgument)?,
    })
}

/// Fetch the catalog and log the matching products.
pub async fn list(args: &CatalogArgs) -> Result<(), CommandError> {
    let query = build_query(args)?;
    let api = public_client()?;
    let products = api.products().await?;

    let matches = query.apply(&products);
    tracing::info!("{} of {} products match", matches.len(), products.len());
    for product in &matches {
        tracing::info!(
            "{:>10}  {}  [{}]  {}",
            product.price.display(),
            product.name,
            product.city.as_deref().unwrap_or("-"),
            product.id
        );
    }
    Ok(())
}
