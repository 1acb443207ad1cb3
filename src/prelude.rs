//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, DEFAULT_SLOT},
    catalog::{Catalog, CatalogError, FeedRow},
    checkout::{CheckoutError, Handoff, OrderSummary, checkout, handoff_url, inquiry},
    config::{ConfigError, LogFormat, LoggingConfig, Settings},
    items::{LineItem, LineItemKey},
    prices::{Price, PriceError},
    products::{Product, ProductId, SizeVariant, Sizes},
    selection::{Selection, SelectionError},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
};
