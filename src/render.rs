//! Table rendering for the terminal front end.

use std::io;

use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{cart::Cart, catalog::Catalog, storage::KeyValueStore};

/// Writes the catalog as a table, one row per product.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_catalog(mut out: impl io::Write, catalog: &Catalog, currency_label: &str) -> io::Result<()> {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Product", "Weight", "Price", "Sizes"]);

    for product in catalog.iter() {
        let sizes = product
            .sizes
            .iter()
            .map(|size| {
                if size.in_stock {
                    size.name.clone()
                } else {
                    format!("{} (sold out)", size.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.weight.clone(),
            format!("{currency_label} {}", product.price),
            sizes,
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::modern_rounded())
        .modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}")
}

/// Writes the cart lines followed by the item count and totals.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_cart<S: KeyValueStore>(
    mut out: impl io::Write,
    cart: &Cart<S>,
    currency_label: &str,
) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }

    let mut builder = Builder::default();

    builder.push_record(["Product", "Size", "Qty", "Unit Price", "Subtotal", "Suggested"]);

    for item in cart.items() {
        let suggested = item
            .suggested_price()
            .map(|price| format!("{currency_label} {price}"))
            .unwrap_or_default();

        builder.push_record([
            item.name().to_string(),
            item.selected_size().name.clone(),
            item.quantity().to_string(),
            format!("{currency_label} {}", item.unit_price()),
            format!("{currency_label} {}", item.subtotal().normalize()),
            suggested,
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::modern_rounded())
        .modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, "Items: {}", cart.count())?;
    writeln!(out, "Total: {currency_label} {}", cart.total().round_dp(2))?;

    if cart.has_suggestions() {
        writeln!(
            out,
            "Suggested total: {currency_label} {}",
            cart.suggested_total().round_dp(2)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        prices::Price,
        products::{Product, SizeVariant},
        storage::MemoryStore,
    };

    use super::*;

    fn candle() -> Product {
        Product::new("candle", "Soy Candle", Price::from("1,200"))
            .with_size(SizeVariant::new("Small"))
            .with_size(SizeVariant::new("Large").out_of_stock())
    }

    #[test]
    fn catalog_table_marks_sold_out_sizes() -> TestResult {
        let catalog = Catalog::new([candle()]);
        let mut out = Vec::new();

        write_catalog(&mut out, &catalog, "Rs.")?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Soy Candle"));
        assert!(text.contains("Rs. 1200"));
        assert!(text.contains("Large (sold out)"));

        Ok(())
    }

    #[test]
    fn empty_cart_says_so() -> TestResult {
        let cart = Cart::load(MemoryStore::new());
        let mut out = Vec::new();

        write_cart(&mut out, &cart, "Rs.")?;

        assert_eq!(String::from_utf8(out)?, "Your cart is empty.\n");

        Ok(())
    }

    #[test]
    fn cart_table_shows_lines_and_totals() -> TestResult {
        let mut cart = Cart::load(MemoryStore::new());
        cart.add_item(&candle(), 2, &SizeVariant::new("Small"), Some(Price::from(1000)));

        let mut out = Vec::new();

        write_cart(&mut out, &cart, "Rs.")?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Soy Candle"));
        assert!(text.contains("Rs. 2400"));
        assert!(text.contains("Items: 2"));
        assert!(text.contains("Total: Rs. 2400"));
        assert!(text.contains("Suggested total: Rs. 2000"));

        Ok(())
    }
}
