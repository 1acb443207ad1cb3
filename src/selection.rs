//! Item selection
//!
//! State behind the product dialog: which size is picked, how many units, and
//! an optional counter offer. Validation happens here so the cart only ever
//! receives well-formed lines.

use thiserror::Error;
use tracing::debug;

use crate::{
    cart::Cart,
    prices::Price,
    products::{Product, SizeVariant},
    storage::KeyValueStore,
};

/// Errors raised by the selection flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The product has no size options to choose from.
    #[error("product {0} has no sizes")]
    NoSizes(String),

    /// The requested size is not offered for the product.
    #[error("size {0:?} is not offered")]
    UnknownSize(String),

    /// The requested size is currently unavailable.
    #[error("size {0:?} is out of stock")]
    OutOfStock(String),

    /// At least one unit must be selected.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

/// Selection state for a single product.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    product: &'a Product,
    size: &'a SizeVariant,
    quantity: u32,
    suggested_price: Option<Price>,
}

impl<'a> Selection<'a> {
    /// Starts a selection on the first in-stock size (or the first size when
    /// nothing is in stock) with a quantity of one.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::NoSizes`] if the product has no sizes.
    pub fn new(product: &'a Product) -> Result<Self, SelectionError> {
        let size = product
            .in_stock_sizes()
            .next()
            .or_else(|| product.sizes.first())
            .ok_or_else(|| SelectionError::NoSizes(product.id.to_string()))?;

        Ok(Self {
            product,
            size,
            quantity: 1,
            suggested_price: None,
        })
    }

    /// Picks a size by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the size is unknown or out of stock; the previous
    /// choice is kept.
    pub fn select_size(&mut self, name: &str) -> Result<(), SelectionError> {
        let size = self
            .product
            .size(name)
            .ok_or_else(|| SelectionError::UnknownSize(name.to_string()))?;

        if !size.in_stock {
            return Err(SelectionError::OutOfStock(name.to_string()));
        }

        self.size = size;

        Ok(())
    }

    /// Adds one unit.
    pub fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Removes one unit, never going below one.
    pub fn decrement(&mut self) {
        self.quantity = self.quantity.saturating_sub(1).max(1);
    }

    /// Sets the quantity directly.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Sets the quantity from free text input. The leading digits are used;
    /// empty or non-numeric input becomes zero, which blocks adding.
    pub fn set_quantity_input(&mut self, input: &str) {
        let digits: String = input
            .trim()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();

        self.quantity = digits.parse().unwrap_or(0);
    }

    /// Sets or clears the per-unit counter offer.
    pub fn set_suggested_price(&mut self, price: Option<Price>) {
        self.suggested_price = price;
    }

    /// The product being selected.
    pub fn product(&self) -> &'a Product {
        self.product
    }

    /// The chosen size.
    pub fn size(&self) -> &'a SizeVariant {
        self.size
    }

    /// The chosen quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The counter offer, if any.
    pub fn suggested_price(&self) -> Option<Price> {
        self.suggested_price
    }

    /// Unit price shown for the chosen size.
    pub fn unit_price(&self) -> Price {
        self.product.price_for(self.size)
    }

    /// Whether the selection can be added to a cart.
    pub fn is_ready(&self) -> bool {
        self.quantity > 0 && self.size.in_stock
    }

    /// Adds the selection to `cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is zero or the size is out of stock.
    pub fn add_to<S: KeyValueStore>(&self, cart: &mut Cart<S>) -> Result<(), SelectionError> {
        if self.quantity == 0 {
            return Err(SelectionError::InvalidQuantity);
        }

        if !self.size.in_stock {
            return Err(SelectionError::OutOfStock(self.size.name.clone()));
        }

        cart.add_item(self.product, self.quantity, self.size, self.suggested_price);

        debug!(product = %self.product.id, size = %self.size.name, "selection added to cart");

        Ok(())
    }

    /// Message asking the shop about this selection directly.
    pub fn inquiry_message(&self) -> String {
        format!(
            "Hello there! I'm interested in your product. I would like to order {} units of {} in size {}.",
            self.quantity, self.product.name, self.size.name
        )
    }
}
