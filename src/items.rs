//! Line Items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    prices::Price,
    products::{Product, ProductId, SizeVariant},
};

/// Identity of a line item within a cart: product id plus size name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineItemKey<'a> {
    /// Product identifier
    pub product_id: &'a str,

    /// Selected size name
    pub size_name: &'a str,
}

impl<'a> LineItemKey<'a> {
    /// Creates a key from its two parts.
    pub fn new(product_id: &'a str, size_name: &'a str) -> Self {
        Self {
            product_id,
            size_name,
        }
    }
}

/// One cart entry: a product snapshot plus purchase details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(flatten)]
    product: Product,

    selected_size: SizeVariant,

    quantity: u32,

    #[serde(default)]
    suggested_price: Option<Price>,
}

impl LineItem {
    /// Snapshots `product` into a new line item.
    pub fn new(
        product: &Product,
        quantity: u32,
        selected_size: &SizeVariant,
        suggested_price: Option<Price>,
    ) -> Self {
        Self {
            product: product.clone(),
            selected_size: selected_size.clone(),
            quantity,
            suggested_price,
        }
    }

    /// Returns the identity key of this item.
    pub fn key(&self) -> LineItemKey<'_> {
        LineItemKey::new(self.product.id.as_str(), &self.selected_size.name)
    }

    /// Product snapshot taken when the item was added.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Product identifier.
    pub fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Product name.
    pub fn name(&self) -> &str {
        &self.product.name
    }

    /// The chosen size.
    pub fn selected_size(&self) -> &SizeVariant {
        &self.selected_size
    }

    /// Number of units.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn increase_quantity(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_add(quantity);
    }

    /// The buyer's per-unit counter offer, if any.
    pub fn suggested_price(&self) -> Option<Price> {
        self.suggested_price
    }

    /// Base unit price from the product snapshot.
    pub fn unit_price(&self) -> Price {
        self.product.price
    }

    /// Base unit price times quantity.
    pub fn subtotal(&self) -> Decimal {
        self.unit_price().times(self.quantity)
    }

    /// Suggested unit price when offered, base price otherwise.
    pub fn offered_unit_price(&self) -> Price {
        self.suggested_price.unwrap_or(self.product.price)
    }

    /// Offered unit price times quantity.
    pub fn offered_subtotal(&self) -> Decimal {
        self.offered_unit_price().times(self.quantity)
    }
}
