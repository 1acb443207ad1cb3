//! Storefront CLI

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

use clap::{Args, Parser, Subcommand};
use storefront::{
    cart::Cart,
    catalog::Catalog,
    checkout::{self, Handoff},
    config::{LoggingConfig, Settings},
    logging,
    prices::Price,
    render,
    selection::Selection,
    storage::FileStore,
};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront catalog and cart", long_about = None)]
struct Cli {
    /// Logging output settings.
    #[command(flatten)]
    logging: LoggingConfig,

    /// Product feed: a JSON array of spreadsheet rows
    #[arg(long, env = "STOREFRONT_FEED", default_value = "products.json", global = true)]
    feed: PathBuf,

    /// Directory holding the persisted cart
    #[arg(long, env = "STOREFRONT_DATA_DIR", default_value = ".storefront", global = true)]
    data_dir: PathBuf,

    /// Optional YAML settings file
    #[arg(long, env = "STOREFRONT_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the products in the feed
    Catalog,

    /// Add a product to the cart
    Add(SelectionArgs),

    /// Print a deep link asking the shop about a product
    Inquire(SelectionArgs),

    /// Remove a line from the cart
    Remove(LineArgs),

    /// Set the quantity of a line; zero removes it
    Update(UpdateArgs),

    /// Empty the cart
    Clear,

    /// Show the cart
    Show,

    /// Compose the order, print its deep link and empty the cart
    Checkout,
}

#[derive(Debug, Args)]
struct SelectionArgs {
    /// Product id
    #[arg(long)]
    product: String,

    /// Size name; defaults to the first size in stock
    #[arg(long)]
    size: Option<String>,

    /// Number of units
    #[arg(long, default_value = "1")]
    quantity: String,

    /// Per-unit counter offer, a plain amount such as 900 or 1,250.50
    #[arg(long)]
    suggested_price: Option<Price>,
}

#[derive(Debug, Args)]
struct LineArgs {
    /// Product id
    #[arg(long)]
    product: String,

    /// Size name
    #[arg(long)]
    size: String,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[command(flatten)]
    line: LineArgs,

    /// New quantity
    #[arg(long)]
    quantity: u32,
}

pub fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = logging::init_subscriber(&cli.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = run(cli) {
        eprintln!("{error}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let settings = match &cli.settings {
        Some(path) => Settings::from_path(path)
            .map_err(|error| format!("failed to load settings: {error}"))?,
        None => Settings::default(),
    };

    let mut cart = Cart::load_from_slot(FileStore::new(&cli.data_dir), settings.cart_slot.clone());
    let label = settings.currency_label.as_str();

    match cli.command {
        Commands::Catalog => {
            let catalog = load_catalog(&cli.feed)?;

            render::write_catalog(io::stdout().lock(), &catalog, label).map_err(output_error)
        }
        Commands::Add(args) => {
            let catalog = load_catalog(&cli.feed)?;
            let selection = build_selection(&catalog, &args)?;

            selection
                .add_to(&mut cart)
                .map_err(|error| format!("cannot add to cart: {error}"))?;

            render::write_cart(io::stdout().lock(), &cart, label).map_err(output_error)
        }
        Commands::Inquire(args) => {
            let catalog = load_catalog(&cli.feed)?;
            let selection = build_selection(&catalog, &args)?;

            print_handoff(&checkout::inquiry(&selection, &settings))
        }
        Commands::Remove(LineArgs { product, size }) => {
            cart.remove_item(&product, &size);

            render::write_cart(io::stdout().lock(), &cart, label).map_err(output_error)
        }
        Commands::Update(UpdateArgs {
            line: LineArgs { product, size },
            quantity,
        }) => {
            cart.update_quantity(&product, &size, quantity);

            render::write_cart(io::stdout().lock(), &cart, label).map_err(output_error)
        }
        Commands::Clear => {
            cart.clear();

            render::write_cart(io::stdout().lock(), &cart, label).map_err(output_error)
        }
        Commands::Show => {
            render::write_cart(io::stdout().lock(), &cart, label).map_err(output_error)
        }
        Commands::Checkout => {
            let handoff = checkout::checkout(&mut cart, &settings)
                .map_err(|error| format!("cannot check out: {error}"))?;

            print_handoff(&handoff)
        }
    }
}

fn load_catalog(feed: &Path) -> Result<Catalog, String> {
    Catalog::from_path(feed)
        .map_err(|error| format!("failed to load catalog from {}: {error}", feed.display()))
}

fn build_selection<'a>(
    catalog: &'a Catalog,
    args: &SelectionArgs,
) -> Result<Selection<'a>, String> {
    let product = catalog
        .get(&args.product)
        .ok_or_else(|| format!("unknown product {}", args.product))?;

    let mut selection = Selection::new(product).map_err(|error| error.to_string())?;

    if let Some(size) = &args.size {
        selection
            .select_size(size)
            .map_err(|error| error.to_string())?;
    }

    selection.set_quantity_input(&args.quantity);
    selection.set_suggested_price(args.suggested_price);

    Ok(selection)
}

fn print_handoff(handoff: &Handoff) -> Result<(), String> {
    let mut out = io::stdout().lock();

    writeln!(out, "{}", handoff.message).map_err(output_error)?;
    writeln!(out).map_err(output_error)?;
    writeln!(out, "{}", handoff.url).map_err(output_error)
}

fn output_error(error: io::Error) -> String {
    format!("failed to write output: {error}")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn suggested_price_accepts_plain_amounts() -> TestResult {
        let cli = Cli::try_parse_from([
            "storefront",
            "add",
            "--product",
            "1",
            "--suggested-price",
            "1,250.50",
        ])?;

        let suggested = match cli.command {
            Commands::Add(args) => args.suggested_price,
            _ => None,
        };

        assert_eq!(
            suggested,
            Some(Price::new(Decimal::new(125_050, 2))),
            "offer should parse as a plain amount"
        );

        Ok(())
    }

    #[test]
    fn suggested_price_rejects_labelled_text() {
        let result = Cli::try_parse_from([
            "storefront",
            "add",
            "--product",
            "1",
            "--suggested-price",
            "Rs. 900",
        ]);

        assert!(result.is_err(), "expected a parse error, got {result:?}");
    }
}
