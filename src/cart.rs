//! Cart

use crate::items::{CartLineItem, ProductId};

/// Outcome of applying a quantity delta to a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new entry was appended.
    Inserted,

    /// An existing entry now holds this quantity.
    Updated {
        /// Resulting quantity, always at least one.
        quantity: i64,
    },

    /// An existing entry was driven to zero or below and removed.
    Removed,

    /// A non-positive delta targeted a slot that is not in the cart.
    Ignored,
}

impl CartChange {
    /// Returns `true` if the cart contents changed.
    pub fn is_mutation(self) -> bool {
        !matches!(self, CartChange::Ignored)
    }
}

/// Ordered collection of line items, unique by `(product, size, colour)`.
///
/// Every stored entry has a quantity of at least one. Insertion order is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart by applying each item in turn.
    ///
    /// Duplicate slots merge and non-positive quantities are dropped, so the result always
    /// satisfies the cart invariants whatever the input looked like.
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut cart = Self::new();

        for item in items {
            cart.apply_delta(item);
        }

        cart
    }

    /// Applies the item's quantity as a signed delta to its slot.
    ///
    /// - Existing slot: the delta is added; a result of zero or less removes the entry.
    /// - Missing slot: a positive delta inserts the item, anything else is ignored.
    pub fn apply_delta(&mut self, item: CartLineItem) -> CartChange {
        let existing = self
            .items
            .iter_mut()
            .enumerate()
            .find(|(_, entry)| entry.same_slot(&item));

        match existing {
            Some((idx, entry)) => {
                let quantity = entry.quantity().saturating_add(item.quantity());

                if quantity <= 0 {
                    self.items.remove(idx);
                    CartChange::Removed
                } else {
                    entry.set_quantity(quantity);
                    CartChange::Updated { quantity }
                }
            }
            None if item.quantity() > 0 => {
                self.items.push(item);
                CartChange::Inserted
            }
            None => CartChange::Ignored,
        }
    }

    /// Removes the entry for a slot. Returns `true` if one was present.
    pub fn remove(&mut self, product_id: &ProductId, size: &str, color: &str) -> bool {
        let before = self.items.len();

        self.items.retain(|item| !item.is_slot(product_id, size, color));

        self.items.len() != before
    }

    /// Removes every entry, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }

    /// Looks up the entry for a slot.
    pub fn get(&self, product_id: &ProductId, size: &str, color: &str) -> Option<&CartLineItem> {
        self.items
            .iter()
            .find(|item| item.is_slot(product_id, size, color))
    }

    /// Sum of quantities across all entries, saturating at `u64::MAX`.
    pub fn total_items(&self) -> u64 {
        self.items.iter().fold(0_u64, |total, item| {
            total.saturating_add(item.quantity().unsigned_abs())
        })
    }

    /// All entries in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Iterate over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.iter()
    }

    /// Number of distinct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tee(quantity: i64) -> CartLineItem {
        CartLineItem::new("tee", "Oversized Tee", 499).with_quantity(quantity)
    }

    #[test]
    fn positive_delta_on_missing_slot_inserts() {
        let mut cart = Cart::new();

        assert_eq!(cart.apply_delta(tee(2)), CartChange::Inserted);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn non_positive_delta_on_missing_slot_is_ignored() {
        let mut cart = Cart::new();

        assert_eq!(cart.apply_delta(tee(-1)), CartChange::Ignored);
        assert_eq!(cart.apply_delta(tee(0)), CartChange::Ignored);
        assert!(cart.is_empty());
    }

    #[test]
    fn delta_on_existing_slot_updates_quantity() {
        let mut cart = Cart::from_items([tee(2)]);

        assert_eq!(cart.apply_delta(tee(3)), CartChange::Updated { quantity: 5 });
        assert_eq!(cart.apply_delta(tee(-4)), CartChange::Updated { quantity: 1 });
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn delta_to_zero_or_below_removes_entry() {
        let mut cart = Cart::from_items([tee(2)]);

        assert_eq!(cart.apply_delta(tee(-5)), CartChange::Removed);
        assert!(cart.is_empty());
    }

    #[test]
    fn removed_item_can_be_added_again() {
        let mut cart = Cart::from_items([tee(1)]);

        cart.apply_delta(tee(-1));

        assert_eq!(cart.apply_delta(tee(1)), CartChange::Inserted);
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn removal_keeps_order_of_remaining_entries() {
        let mut cart = Cart::from_items([
            CartLineItem::new("a", "A", 100),
            CartLineItem::new("b", "B", 200),
            CartLineItem::new("c", "C", 300),
        ]);

        assert!(cart.remove(&ProductId::from("b"), "M", "Black"));

        let ids: Vec<String> = cart.iter().map(|i| i.product_id().to_string()).collect();

        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn remove_missing_slot_is_noop() {
        let mut cart = Cart::from_items([tee(1)]);

        assert!(!cart.remove(&ProductId::from("tee"), "XL", "Black"));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn from_items_merges_duplicates_and_drops_non_positive() {
        let cart = Cart::from_items([
            tee(1),
            tee(2),
            CartLineItem::new("x", "X", 1).with_quantity(0),
        ]);

        assert_eq!(cart.len(), 1);
        assert_eq!(
            cart.get(&ProductId::from("tee"), "M", "Black")
                .map(CartLineItem::quantity),
            Some(3)
        );
    }

    #[test]
    fn clear_reports_removed_entries() {
        let mut cart = Cart::from_items([tee(1), tee(1).with_size("L")]);

        assert_eq!(cart.clear(), 2);
        assert!(cart.is_empty());
        assert_eq!(cart.clear(), 0);
    }

    #[test]
    fn total_items_saturates_instead_of_overflowing() {
        let mut cart = Cart::new();

        for size in ["S", "M", "L"] {
            cart.apply_delta(tee(i64::MAX).with_size(size));
        }

        assert_eq!(
            cart.apply_delta(tee(1).with_size("S")),
            CartChange::Updated { quantity: i64::MAX }
        );
        assert_eq!(cart.len(), 3);
        assert_eq!(cart.total_items(), u64::MAX);
    }

    #[test]
    fn change_mutation_flag() {
        assert!(CartChange::Inserted.is_mutation());
        assert!(CartChange::Removed.is_mutation());
        assert!(CartChange::Updated { quantity: 1 }.is_mutation());
        assert!(!CartChange::Ignored.is_mutation());
    }
}
