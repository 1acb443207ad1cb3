//! Checkout
//!
//! Orders are not placed here. The cart is written up as a plain-text order
//! and handed to a messaging deep link; the shop takes it from there.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::info;

use crate::{cart::Cart, config::Settings, selection::Selection, storage::KeyValueStore};

/// Characters left alone by URI component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const ORDER_GREETING: &str = "Hello there! I would like to place an order for:\n\n";

/// Errors raised by checkout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,
}

/// Human-readable order built from a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    message: String,
    total: Decimal,
    suggested_total: Option<Decimal>,
}

impl OrderSummary {
    /// Writes up every line of `cart`, then the totals.
    ///
    /// When any line carries a suggested price both the original and the
    /// suggested totals are listed.
    pub fn from_cart<S: KeyValueStore>(cart: &Cart<S>, currency_label: &str) -> Self {
        let mut message = String::from(ORDER_GREETING);

        for (position, item) in cart.items().iter().enumerate() {
            message.push_str(&format!(
                "{}.    {} x {} ({}) - Size: {}\n    Price: {currency_label} {} per unit\n    Subtotal: {currency_label} {}",
                position + 1,
                item.quantity(),
                item.name(),
                item.product().weight,
                item.selected_size().name,
                item.unit_price(),
                item.subtotal().normalize(),
            ));

            if let Some(suggested) = item.suggested_price() {
                message.push_str(&format!(
                    "\n    (I'd like to suggest {currency_label} {suggested} per unit - Suggested subtotal: {currency_label} {})",
                    item.offered_subtotal().normalize(),
                ));
            }

            message.push_str("\n\n");
        }

        let total = cart.total();
        let suggested_total = cart.has_suggestions().then(|| cart.suggested_total());

        match suggested_total {
            Some(suggested) => {
                message.push_str(&format!(
                    "\nOriginal Total: {currency_label} {}",
                    format_total(total)
                ));
                message.push_str(&format!(
                    "\nSuggested Total: {currency_label} {}",
                    format_total(suggested)
                ));
            }
            None => {
                message.push_str(&format!("\nTotal: {currency_label} {}", format_total(total)));
            }
        }

        Self {
            message,
            total,
            suggested_total,
        }
    }

    /// The order text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Total at base prices.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Total at offered prices, when any line carries a suggestion.
    pub fn suggested_total(&self) -> Option<Decimal> {
        self.suggested_total
    }
}

/// A composed message and the deep link that delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    /// Message text
    pub message: String,

    /// Deep link opening a chat with the message pre-filled
    pub url: String,
}

impl Handoff {
    /// Builds the deep link for `message` addressed to `phone`.
    pub fn new(phone: &str, message: String) -> Self {
        let url = handoff_url(phone, &message);

        Self { message, url }
    }
}

/// Deep link opening a chat with `phone` and `message` pre-filled.
pub fn handoff_url(phone: &str, message: &str) -> String {
    format!(
        "https://wa.me/{phone}/?text={}",
        utf8_percent_encode(message, URI_COMPONENT)
    )
}

/// Composes the order for `cart`, then clears it.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] without touching the cart if it is empty.
pub fn checkout<S: KeyValueStore>(
    cart: &mut Cart<S>,
    settings: &Settings,
) -> Result<Handoff, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let summary = OrderSummary::from_cart(cart, &settings.currency_label);
    let handoff = Handoff::new(&settings.checkout_phone, summary.message);

    info!(lines = cart.len(), units = cart.count(), "order handed off");

    cart.clear();

    Ok(handoff)
}

/// Deep link asking the shop about a single selection.
pub fn inquiry(selection: &Selection<'_>, settings: &Settings) -> Handoff {
    Handoff::new(&settings.inquiry_phone, selection.inquiry_message())
}

fn format_total(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
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

    fn shirt() -> Product {
        Product::new("shirt", "Linen Shirt", Price::from("1,000"))
            .with_weight("200g")
            .with_size(SizeVariant::new("M"))
    }

    fn mug() -> Product {
        Product::new("mug", "Clay Mug", Price::from(500))
            .with_weight("350ml")
            .with_size(SizeVariant::new("One"))
    }

    fn filled_cart(suggest: Option<Price>) -> Cart<MemoryStore> {
        let mut cart = Cart::load(MemoryStore::new());

        cart.add_item(&shirt(), 2, &SizeVariant::new("M"), suggest);
        cart.add_item(&mug(), 1, &SizeVariant::new("One"), None);

        cart
    }

    #[test]
    fn summary_lists_lines_and_total() {
        let summary = OrderSummary::from_cart(&filled_cart(None), "Rs.");

        assert_eq!(
            summary.message(),
            "Hello there! I would like to place an order for:\n\n\
             1.    2 x Linen Shirt (200g) - Size: M\n    Price: Rs. 1000 per unit\n    Subtotal: Rs. 2000\n\n\
             2.    1 x Clay Mug (350ml) - Size: One\n    Price: Rs. 500 per unit\n    Subtotal: Rs. 500\n\n\
             \nTotal: Rs. 2500.00"
        );
        assert_eq!(summary.total(), Decimal::from(2500));
        assert_eq!(summary.suggested_total(), None);
    }

    #[test]
    fn summary_includes_suggested_prices() {
        let summary = OrderSummary::from_cart(&filled_cart(Some(Price::from(850))), "Rs.");

        assert!(summary.message().contains(
            "(I'd like to suggest Rs. 850 per unit - Suggested subtotal: Rs. 1700)"
        ));
        assert!(summary.message().ends_with(
            "\nOriginal Total: Rs. 2500.00\nSuggested Total: Rs. 2200.00"
        ));
        assert_eq!(summary.suggested_total(), Some(Decimal::from(2200)));
    }

    #[test]
    fn zero_offer_is_still_listed() {
        let summary = OrderSummary::from_cart(&filled_cart(Some(Price::ZERO)), "Rs.");

        assert!(summary.message().contains(
            "(I'd like to suggest Rs. 0 per unit - Suggested subtotal: Rs. 0)"
        ));
        assert!(summary.message().ends_with(
            "\nOriginal Total: Rs. 2500.00\nSuggested Total: Rs. 500.00"
        ));
    }

    #[test]
    fn totals_round_to_two_places() {
        assert_eq!(format_total(Decimal::new(10_005, 3)), "10.01");
        assert_eq!(format_total(Decimal::from(7)), "7.00");
    }

    #[test]
    fn handoff_url_encodes_like_uri_components() {
        assert_eq!(
            handoff_url("92300", "Hi there! (2) x\nRs. 5,000 & more"),
            "https://wa.me/92300/?text=Hi%20there!%20(2)%20x%0ARs.%205%2C000%20%26%20more"
        );
    }

    #[test]
    fn checkout_empty_cart_is_refused() {
        let mut cart = Cart::load(MemoryStore::new());

        assert_eq!(
            checkout(&mut cart, &Settings::default()),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn checkout_hands_off_and_clears() -> TestResult {
        let mut cart = filled_cart(None);
        let settings = Settings::default();

        let handoff = checkout(&mut cart, &settings)?;

        assert!(handoff.url.starts_with("https://wa.me/923452102501/?text=Hello%20there!"));
        assert!(handoff.message.ends_with("Total: Rs. 2500.00"));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn inquiry_uses_inquiry_phone() -> TestResult {
        let product = mug();
        let selection = Selection::new(&product)?;

        let handoff = inquiry(&selection, &Settings::default());

        assert!(handoff.url.starts_with("https://wa.me/923323327425/?text="));
        assert!(handoff.message.contains("1 units of Clay Mug in size One"));

        Ok(())
    }
}
