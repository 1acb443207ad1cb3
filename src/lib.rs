//! Storefront
//!
//! Catalog decoding, item selection, a persisted shopping cart and a
//! messaging checkout handoff for a small online shop.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod items;
pub mod logging;
pub mod prelude;
pub mod prices;
pub mod products;
pub mod render;
pub mod selection;
pub mod storage;
