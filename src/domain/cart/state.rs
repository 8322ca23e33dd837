use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::value_objects::{CartLine, ItemId, MenuItem, Price, PriceId, RestaurantId};

// ============================================================================
// Cart - owned cart state with snapshot-returning operations
// ============================================================================
//
// Every operation borrows the current cart and returns the next one. Lines
// keep the order in which items were first added.
//
// Invariants:
// - at most one line per item id
// - every line present has quantity >= 1
// - a line's selected price only changes through `select_price`
//
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    restaurant: Option<RestaurantId>,
    lines: IndexMap<ItemId, CartLine>,
}

impl Cart {
    /// Empty cart bound to a restaurant
    pub fn for_restaurant(restaurant: RestaurantId) -> Self {
        Self {
            restaurant: Some(restaurant),
            lines: IndexMap::new(),
        }
    }

    pub fn restaurant(&self) -> Option<RestaurantId> {
        self.restaurant
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn line(&self, item_id: ItemId) -> Option<&CartLine> {
        self.lines.get(&item_id)
    }

    pub fn quantity_of(&self, item_id: ItemId) -> u32 {
        self.lines.get(&item_id).map_or(0, |line| line.quantity)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `item`. Re-adding an item already in the cart bumps its
    /// quantity and leaves the selected price alone.
    #[must_use]
    pub fn add_item(&self, item: &MenuItem) -> Self {
        let mut next = self.clone();
        next.lines
            .entry(item.item_id)
            .and_modify(|line| line.quantity = line.quantity.saturating_add(1))
            .or_insert_with(|| CartLine::from_menu_item(item));
        next
    }

    /// Take one unit away, dropping the line when it was the last one.
    /// Unknown items are ignored.
    #[must_use]
    pub fn remove_one(&self, item_id: ItemId) -> Self {
        self.adjust_quantity(item_id, -1)
    }

    /// Shift a line's quantity by `delta`, clamped at zero. A line that ends
    /// at zero is removed. Unknown items are ignored.
    #[must_use]
    pub fn adjust_quantity(&self, item_id: ItemId, delta: i64) -> Self {
        let mut next = self.clone();
        let Some(line) = next.lines.get_mut(&item_id) else {
            return next;
        };

        let adjusted = i64::from(line.quantity).saturating_add(delta).max(0);
        let quantity = u32::try_from(adjusted).unwrap_or(u32::MAX);

        if quantity == 0 {
            next.lines.shift_remove(&item_id);
        } else {
            line.quantity = quantity;
        }
        next
    }

    /// Switch a line to one of its own price variants. Unknown lines and
    /// variants the item does not offer are ignored.
    #[must_use]
    pub fn select_price(&self, item_id: ItemId, price_id: PriceId) -> Self {
        let mut next = self.clone();
        if let Some(line) = next.lines.get_mut(&item_id) {
            if let Some(variant) = line.variants.iter().find(|v| v.id == price_id) {
                line.selected_price = Price::Variant {
                    id: variant.id,
                    amount: variant.price,
                };
            }
        }
        next
    }

    /// Select the restaurant the order is placed with. Moving to a different
    /// restaurant discards every line; re-selecting the current one keeps them.
    #[must_use]
    pub fn select_restaurant(&self, restaurant: RestaurantId) -> Self {
        if self.restaurant == Some(restaurant) {
            return self.clone();
        }
        Self::for_restaurant(restaurant)
    }

    /// Drop every line, keeping the selected restaurant
    #[must_use]
    pub fn clear(&self) -> Self {
        Self {
            restaurant: self.restaurant,
            lines: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn item_a() -> MenuItem {
        MenuItem::new(1, "Butter Chicken", Decimal::new(23000, 2))
    }

    fn pizza() -> MenuItem {
        MenuItem::new(2, "Margherita", Decimal::new(300, 0))
            .with_variant(21, "Regular", Decimal::new(250, 0))
            .with_variant(22, "Large", Decimal::new(420, 0))
    }

    fn cart() -> Cart {
        Cart::for_restaurant(RestaurantId(7))
    }

    #[test]
    fn test_add_new_item_inserts_single_unit() {
        let cart = cart().add_item(&item_a());

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ItemId(1)), 1);
        assert_eq!(cart.line(ItemId(1)).unwrap().selected_price, Price::Base(Decimal::new(23000, 2)));
    }

    #[test]
    fn test_add_existing_item_merges() {
        let cart = cart().add_item(&item_a()).add_item(&item_a());

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(ItemId(1)), 2);
    }

    #[test]
    fn test_add_variant_item_defaults_to_first_variant() {
        let cart = cart().add_item(&pizza());
        let line = cart.line(ItemId(2)).unwrap();

        assert_eq!(line.selected_price.price_id(), Some(PriceId(21)));
        assert_eq!(line.unit_price(), Decimal::new(250, 0));
    }

    #[test]
    fn test_operations_do_not_touch_original() {
        let before = cart().add_item(&item_a());
        let after = before.adjust_quantity(ItemId(1), 4);

        assert_eq!(before.quantity_of(ItemId(1)), 1);
        assert_eq!(after.quantity_of(ItemId(1)), 5);
    }

    #[test]
    fn test_remove_one_decrements() {
        let cart = cart().add_item(&item_a()).add_item(&item_a()).remove_one(ItemId(1));
        assert_eq!(cart.quantity_of(ItemId(1)), 1);
    }

    #[test]
    fn test_remove_last_unit_deletes_line() {
        let cart = cart().add_item(&item_a()).remove_one(ItemId(1));

        assert!(cart.is_empty());
        assert!(cart.line(ItemId(1)).is_none());
    }

    #[test]
    fn test_remove_unknown_item_is_noop() {
        let before = cart().add_item(&item_a());
        assert_eq!(before.remove_one(ItemId(99)), before);
    }

    #[test]
    fn test_adjust_clamps_at_zero() {
        let cart = cart().add_item(&item_a()).adjust_quantity(ItemId(1), 2);
        assert_eq!(cart.quantity_of(ItemId(1)), 3);

        let cart = cart.adjust_quantity(ItemId(1), -10);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_adjust_unknown_item_is_noop() {
        let before = cart().add_item(&item_a());
        assert_eq!(before.adjust_quantity(ItemId(42), 3), before);
    }

    #[test]
    fn test_adjust_saturates_at_u32_max() {
        let cart = cart().add_item(&item_a()).adjust_quantity(ItemId(1), i64::MAX);
        assert_eq!(cart.quantity_of(ItemId(1)), u32::MAX);
    }

    #[test]
    fn test_selected_price_survives_quantity_changes() {
        let cart = cart()
            .add_item(&pizza())
            .select_price(ItemId(2), PriceId(22))
            .add_item(&pizza())
            .adjust_quantity(ItemId(2), 3)
            .remove_one(ItemId(2));

        let line = cart.line(ItemId(2)).unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(line.selected_price.price_id(), Some(PriceId(22)));
    }

    #[test]
    fn test_select_unknown_variant_is_noop() {
        let before = cart().add_item(&pizza());
        assert_eq!(before.select_price(ItemId(2), PriceId(999)), before);
    }

    #[test]
    fn test_switch_restaurant_resets_lines() {
        let cart = cart()
            .add_item(&item_a())
            .adjust_quantity(ItemId(1), 8)
            .add_item(&pizza())
            .select_restaurant(RestaurantId(8));

        assert!(cart.is_empty());
        assert_eq!(cart.restaurant(), Some(RestaurantId(8)));
    }

    #[test]
    fn test_reselect_same_restaurant_keeps_lines() {
        let cart = cart().add_item(&item_a()).select_restaurant(RestaurantId(7));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let cart = cart()
            .add_item(&pizza())
            .add_item(&item_a())
            .add_item(&MenuItem::new(3, "Raita", Decimal::new(60, 0)))
            .remove_one(ItemId(1))
            .add_item(&item_a());

        let order: Vec<ItemId> = cart.lines().map(|l| l.item_id).collect();
        assert_eq!(order, vec![ItemId(2), ItemId(3), ItemId(1)]);
    }

    #[test]
    fn test_clear_keeps_restaurant() {
        let cart = cart().add_item(&item_a()).clear();

        assert!(cart.is_empty());
        assert_eq!(cart.restaurant(), Some(RestaurantId(7)));
    }
}
