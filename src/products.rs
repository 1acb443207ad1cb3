//! Products

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::prices::Price;

/// Stable catalog identifier of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One purchasable size option of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariant {
    /// Short label, unique within a product.
    pub name: String,

    /// Availability flag.
    #[serde(default)]
    pub in_stock: bool,

    /// Size specific price overriding the product price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

impl SizeVariant {
    /// Creates an in-stock size without a price override.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            in_stock: true,
            price: None,
        }
    }

    /// Marks the size as out of stock.
    #[must_use]
    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }

    /// Sets a size specific price.
    #[must_use]
    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }
}

/// Ordered size options of a product.
pub type Sizes = SmallVec<[SizeVariant; 6]>;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Display weight, e.g. `"250g"`
    #[serde(default)]
    pub weight: String,

    /// Image location
    #[serde(default)]
    pub image_src: String,

    /// Image alternative text
    #[serde(default)]
    pub image_alt: String,

    /// Display rating
    #[serde(default)]
    pub rating: String,

    /// Base price
    pub price: Price,

    /// Size options, in display order
    pub sizes: Sizes,
}

impl Product {
    /// Creates a product with empty display fields.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight: String::new(),
            image_src: String::new(),
            image_alt: String::new(),
            rating: String::new(),
            price,
            sizes: Sizes::new(),
        }
    }

    /// Appends a size option.
    #[must_use]
    pub fn with_size(mut self, size: SizeVariant) -> Self {
        self.sizes.push(size);
        self
    }

    /// Sets the display weight.
    #[must_use]
    pub fn with_weight(mut self, weight: impl Into<String>) -> Self {
        self.weight = weight.into();
        self
    }

    /// Looks up a size option by name.
    pub fn size(&self, name: &str) -> Option<&SizeVariant> {
        self.sizes.iter().find(|size| size.name == name)
    }

    /// Iterates over the sizes that are currently in stock.
    pub fn in_stock_sizes(&self) -> impl Iterator<Item = &SizeVariant> {
        self.sizes.iter().filter(|size| size.in_stock)
    }

    /// Unit price for the given size, falling back to the base price.
    pub fn price_for(&self, size: &SizeVariant) -> Price {
        size.price.unwrap_or(self.price)
    }
}
