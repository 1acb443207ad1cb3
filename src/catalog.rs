//! Catalog
//!
//! The product feed is a spreadsheet export: every cell arrives as a string
//! or a number, and `sizes` holds a JSON-encoded array of size variants.

use std::{fs, path::Path};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    prices::Price,
    products::{Product, ProductId, SizeVariant, Sizes},
};

/// Errors raised while decoding the product feed.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The feed file could not be read.
    #[error("failed to read product feed: {0}")]
    Io(#[from] std::io::Error),

    /// The feed document is not a JSON array.
    #[error("malformed product feed: {0}")]
    Feed(#[source] serde_json::Error),

    /// A row's `sizes` cell is not a JSON array of size variants.
    #[error("product {id} has malformed sizes: {source}")]
    InvalidSizes {
        /// Product identifier
        id: ProductId,
        /// Decoding failure
        #[source]
        source: serde_json::Error,
    },

    /// A row has no size options.
    #[error("product {0} has no sizes")]
    NoSizes(ProductId),

    /// A row lists the same size name twice.
    #[error("product {id} lists size {name:?} more than once")]
    DuplicateSize {
        /// Product identifier
        id: ProductId,
        /// Repeated size name
        name: String,
    },
}

/// A raw feed row, before `sizes` is decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRow {
    /// Product identifier
    #[serde(deserialize_with = "cell")]
    pub id: String,

    /// Product name
    #[serde(default, deserialize_with = "cell")]
    pub name: String,

    /// Display weight
    #[serde(default, deserialize_with = "cell")]
    pub weight: String,

    /// Image location
    #[serde(default, deserialize_with = "cell")]
    pub image_src: String,

    /// Image alternative text
    #[serde(default, deserialize_with = "cell")]
    pub image_alt: String,

    /// Display rating
    #[serde(default, deserialize_with = "cell")]
    pub rating: String,

    /// Base price, as a number or display string
    #[serde(default)]
    pub price: Price,

    /// JSON-encoded size variants
    #[serde(default, deserialize_with = "cell")]
    pub sizes: String,
}

impl TryFrom<FeedRow> for Product {
    type Error = CatalogError;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        let id = ProductId::new(row.id);

        let sizes: Vec<SizeVariant> =
            serde_json::from_str(&row.sizes).map_err(|source| CatalogError::InvalidSizes {
                id: id.clone(),
                source,
            })?;

        if sizes.is_empty() {
            return Err(CatalogError::NoSizes(id));
        }

        let mut names = FxHashSet::default();

        if let Some(repeated) = sizes.iter().find(|size| !names.insert(size.name.as_str())) {
            return Err(CatalogError::DuplicateSize {
                name: repeated.name.clone(),
                id,
            });
        }

        Ok(Product {
            id,
            name: row.name,
            weight: row.weight,
            image_src: row.image_src,
            image_alt: row.image_alt,
            rating: row.rating,
            price: row.price,
            sizes: Sizes::from_vec(sizes),
        })
    }
}

/// Decoded product catalog, in feed order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: FxHashMap<ProductId, usize>,
}

impl Catalog {
    /// Builds a catalog from already decoded products. Later duplicates of an
    /// id are dropped.
    pub fn new(products: impl IntoIterator<Item = Product>) -> Self {
        let mut catalog = Self::default();

        for product in products {
            catalog.push(product);
        }

        catalog
    }

    /// Decodes feed rows, skipping rows that cannot be turned into products.
    pub fn from_rows(rows: impl IntoIterator<Item = FeedRow>) -> Self {
        let mut catalog = Self::default();

        for row in rows {
            match Product::try_from(row) {
                Ok(product) => catalog.push(product),
                Err(error) => warn!(%error, "skipping feed row"),
            }
        }

        debug!(products = catalog.len(), "catalog decoded");

        catalog
    }

    /// Decodes a feed document: a JSON array of rows. Rows that do not decode
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Feed`] if the document is not a JSON array.
    pub fn from_json(feed: &str) -> Result<Self, CatalogError> {
        let values: Vec<Value> = serde_json::from_str(feed).map_err(CatalogError::Feed)?;

        let rows = values
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| match FeedRow::deserialize(value) {
                Ok(row) => Some(row),
                Err(error) => {
                    warn!(row = position, %error, "skipping undecodable feed row");
                    None
                }
            });

        Ok(Self::from_rows(rows))
    }

    /// Reads and decodes a feed document from disk.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the file cannot be read or decoded.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let feed = fs::read_to_string(path)?;

        Self::from_json(&feed)
    }

    /// Looks up a product by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|&position| self.products.get(position))
    }

    /// Iterates over products in feed order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn push(&mut self, product: Product) {
        if self.index.contains_key(&product.id) {
            warn!(product = %product.id, "skipping duplicate product id");
            return;
        }

        self.index.insert(product.id.clone(), self.products.len());
        self.products.push(product);
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

fn cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Text(text)) => text,
        Some(Cell::Number(number)) => number.to_string(),
        Some(Cell::Flag(flag)) => flag.to_string(),
        None => String::new(),
    })
}
