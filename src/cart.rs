//! Cart
//!
//! The cart store owns the line items, answers totals and counts, and writes a
//! full snapshot to its slot after every mutation.

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::{
    items::{LineItem, LineItemKey},
    prices::Price,
    products::{Product, SizeVariant},
    storage::KeyValueStore,
};

/// Slot name used when none is configured.
pub const DEFAULT_SLOT: &str = "cart";

/// Cart store
#[derive(Debug)]
pub struct Cart<S> {
    items: Vec<LineItem>,
    store: S,
    slot: String,
}

impl<S: KeyValueStore> Cart<S> {
    /// Loads the cart kept in the default slot.
    pub fn load(store: S) -> Self {
        Self::load_from_slot(store, DEFAULT_SLOT)
    }

    /// Loads the cart kept in `slot`.
    ///
    /// A missing, unreadable or malformed snapshot yields an empty cart.
    pub fn load_from_slot(store: S, slot: impl Into<String>) -> Self {
        let slot = slot.into();
        let items = read_snapshot(&store, &slot);

        debug!(slot = %slot, items = items.len(), "cart loaded");

        Self { items, store, slot }
    }

    /// Adds `quantity` units of `product` in `selected_size`.
    ///
    /// If the product and size are already in the cart the quantity is added to
    /// the existing line, keeping its original size details and suggested price.
    /// A zero quantity is ignored.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        selected_size: &SizeVariant,
        suggested_price: Option<Price>,
    ) {
        if quantity == 0 {
            debug!(product = %product.id, size = %selected_size.name, "ignoring zero quantity add");
            return;
        }

        let key = LineItemKey::new(product.id.as_str(), &selected_size.name);

        if let Some(item) = self.find_mut(key) {
            item.increase_quantity(quantity);
        } else {
            self.items.push(LineItem::new(
                product,
                quantity,
                selected_size,
                suggested_price,
            ));
        }

        debug!(product = %product.id, size = %selected_size.name, quantity, "item added");

        self.persist();
    }

    /// Removes the line matching `product_id` and `size_name`, if present.
    pub fn remove_item(&mut self, product_id: &str, size_name: &str) {
        let key = LineItemKey::new(product_id, size_name);

        self.items.retain(|item| item.key() != key);

        debug!(product = product_id, size = size_name, "item removed");

        self.persist();
    }

    /// Sets the quantity of a line. Zero removes the line instead.
    pub fn update_quantity(&mut self, product_id: &str, size_name: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id, size_name);
            return;
        }

        if let Some(item) = self.find_mut(LineItemKey::new(product_id, size_name)) {
            item.set_quantity(quantity);

            debug!(product = product_id, size = size_name, quantity, "quantity updated");
        }

        self.persist();
    }

    /// Empties the cart and removes its slot.
    pub fn clear(&mut self) {
        self.items.clear();

        if let Err(error) = self.store.remove(&self.slot) {
            warn!(slot = %self.slot, %error, "failed to remove cart snapshot");
        }

        debug!(slot = %self.slot, "cart cleared");
    }

    /// Sum of base unit price times quantity over every line.
    ///
    /// Suggested prices never contribute here; see [`Cart::suggested_total`].
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |total, item| {
                total.saturating_add(item.subtotal())
            })
    }

    /// Sum of offered unit price times quantity, where a line's offered price
    /// is its suggested price when present and its base price otherwise.
    pub fn suggested_total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |total, item| {
                total.saturating_add(item.offered_subtotal())
            })
    }

    /// Whether any line carries a suggested price.
    pub fn has_suggestions(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.suggested_price().is_some())
    }

    /// Total number of units across all lines.
    pub fn count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity()))
            .sum()
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Looks up a line by key.
    pub fn get(&self, key: LineItemKey<'_>) -> Option<&LineItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Name of the slot backing this cart.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Releases the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    fn find_mut(&mut self, key: LineItemKey<'_>) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    fn persist(&mut self) {
        let snapshot = match serde_json::to_string(&self.items) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(slot = %self.slot, %error, "failed to encode cart snapshot");
                return;
            }
        };

        if let Err(error) = self.store.set(&self.slot, &snapshot) {
            warn!(slot = %self.slot, %error, "failed to write cart snapshot");
        }
    }
}

fn read_snapshot<S: KeyValueStore>(store: &S, slot: &str) -> Vec<LineItem> {
    let raw = match store.get(slot) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(error) => {
            warn!(slot, %error, "failed to read cart snapshot, starting empty");
            return Vec::new();
        }
    };

    let items: Vec<LineItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(error) => {
            warn!(slot, %error, "malformed cart snapshot, starting empty");
            return Vec::new();
        }
    };

    if !is_valid_snapshot(&items) {
        warn!(slot, "cart snapshot violates line item invariants, starting empty");
        return Vec::new();
    }

    items
}

fn is_valid_snapshot(items: &[LineItem]) -> bool {
    let mut seen = FxHashSet::default();

    items
        .iter()
        .all(|item| item.quantity() > 0 && seen.insert(item.key()))
}
