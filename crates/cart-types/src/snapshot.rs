use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::item::{CartItem, ProductDescriptor};
use crate::mutation::CartMutation;

/// The ordered contents of a cart.
///
/// Lines keep their insertion order. New products append to the end and
/// quantity changes happen in place, so a line never moves. Ids are unique
/// across lines and every quantity is at least 1, provided the snapshot is
/// only changed through [`CartSnapshot::apply`] and its helpers.
///
/// The serialized form is a bare JSON array of [`CartItem`] objects.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot {
    items: Vec<CartItem>,
}

impl CartSnapshot {
    /// An empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing list of lines as-is.
    ///
    /// No uniqueness or quantity checks are made; this is how persisted
    /// snapshots are trusted on load.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by product id.
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of all line totals.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Apply a mutation. Returns `true` if the snapshot changed.
    pub fn apply(&mut self, mutation: &CartMutation) -> bool {
        match mutation {
            CartMutation::Add(product) => {
                self.add(product.clone());
                true
            }
            CartMutation::Increment { id } => self.increment(id),
            CartMutation::Decrement { id } => self.decrement(id),
        }
    }

    /// Add one unit of `product`.
    ///
    /// An existing line with the same id is replaced in place by the new
    /// descriptor fields with its quantity raised by one; otherwise a new
    /// line with quantity 1 is appended.
    pub fn add(&mut self, product: ProductDescriptor) {
        match self.position(&product.id) {
            Some(idx) => {
                let slot = &mut self.items[idx];
                let quantity = slot.quantity.saturating_add(1);
                *slot = CartItem::with_quantity(product, quantity);
            }
            None => self.items.push(CartItem::from_product(product)),
        }
    }

    /// Raise the quantity of line `id` by one. Unknown ids are a no-op.
    pub fn increment(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Lower the quantity of line `id` by one, removing the line when it
    /// would reach zero. Unknown ids are a no-op.
    pub fn decrement(&mut self, id: &str) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        if self.items[idx].quantity > 1 {
            self.items[idx].quantity -= 1;
        } else {
            self.items.remove(idx);
        }
        true
    }

    /// Serialize to the persisted JSON form.
    pub fn encode(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Encode(e.to_string()))
    }

    /// Parse the persisted JSON form.
    pub fn decode(raw: &str) -> Result<Self, TypeError> {
        serde_json::from_str(raw).map_err(|e| TypeError::Decode(e.to_string()))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

impl From<Vec<CartItem>> for CartSnapshot {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl<'a> IntoIterator for &'a CartSnapshot {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
