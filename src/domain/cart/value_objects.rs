use std::fmt;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Cart Value Objects
// ============================================================================

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

integer_id!(
    /// Menu item identifier, unique within a cart
    ItemId
);
integer_id!(
    /// Price variant identifier (e.g. a size of a dish)
    PriceId
);
integer_id!(RestaurantId);
integer_id!(CustomerId);
integer_id!(AddressId);

/// Alternate priced option for a menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceVariant {
    pub id: PriceId,
    #[serde(default)]
    pub label: String,
    pub price: Decimal,
}

/// Menu item descriptor as supplied by the menu provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub item_id: ItemId,
    pub title: String,
    pub base_price: Decimal,
    #[serde(default)]
    pub price_variants: Vec<PriceVariant>,
}

impl MenuItem {
    pub fn new(item_id: u64, title: impl Into<String>, base_price: Decimal) -> Self {
        Self {
            item_id: ItemId(item_id),
            title: title.into(),
            base_price,
            price_variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, id: u64, label: impl Into<String>, price: Decimal) -> Self {
        self.price_variants.push(PriceVariant {
            id: PriceId(id),
            label: label.into(),
            price,
        });
        self
    }

    /// Price selected when the item first lands in a cart: the first variant,
    /// or the base price when the item has none.
    pub fn default_price(&self) -> Price {
        match self.price_variants.first() {
            Some(variant) => Price::Variant {
                id: variant.id,
                amount: variant.price,
            },
            None => Price::Base(self.base_price),
        }
    }
}

/// Selected unit price of a cart line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Price {
    Base(Decimal),
    Variant { id: PriceId, amount: Decimal },
}

impl Price {
    pub fn amount(&self) -> Decimal {
        match self {
            Price::Base(amount) => *amount,
            Price::Variant { amount, .. } => *amount,
        }
    }

    /// Variant id, `None` for the base price
    pub fn price_id(&self) -> Option<PriceId> {
        match self {
            Price::Base(_) => None,
            Price::Variant { id, .. } => Some(*id),
        }
    }
}

/// One menu item entry of an in-progress manual order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: ItemId,
    pub title: String,
    pub base_price: Decimal,
    pub variants: Vec<PriceVariant>,
    pub selected_price: Price,
    pub quantity: u32,
}

impl CartLine {
    pub fn from_menu_item(item: &MenuItem) -> Self {
        Self {
            item_id: item.item_id,
            title: item.title.clone(),
            base_price: item.base_price,
            variants: item.price_variants.clone(),
            selected_price: item.default_price(),
            quantity: 1,
        }
    }

    pub fn unit_price(&self) -> Decimal {
        self.selected_price.amount()
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}

/// Lifecycle status of a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartStatus {
    /// Accepting edits
    Open,
    /// An order request is outstanding, edits are locked
    Submitting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_price_without_variants_is_base() {
        let item = MenuItem::new(1, "Paneer Tikka", Decimal::new(23000, 2));
        assert_eq!(item.default_price(), Price::Base(Decimal::new(23000, 2)));
        assert_eq!(item.default_price().price_id(), None);
    }

    #[test]
    fn test_default_price_picks_first_variant() {
        let item = MenuItem::new(2, "Pizza", Decimal::new(300, 0))
            .with_variant(11, "Small", Decimal::new(250, 0))
            .with_variant(12, "Large", Decimal::new(450, 0));

        assert_eq!(
            item.default_price(),
            Price::Variant { id: PriceId(11), amount: Decimal::new(250, 0) }
        );
    }

    #[test]
    fn test_line_total() {
        let item = MenuItem::new(3, "Lassi", Decimal::new(7550, 2));
        let mut line = CartLine::from_menu_item(&item);
        line.quantity = 3;

        assert_eq!(line.unit_price(), Decimal::new(7550, 2));
        assert_eq!(line.line_total(), Decimal::new(22650, 2));
    }

    #[test]
    fn test_menu_item_from_json_without_variants() {
        let json = r#"{"item_id": 5, "title": "Naan", "base_price": "40.00"}"#;
        let item: MenuItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.item_id, ItemId(5));
        assert!(item.price_variants.is_empty());
        assert_eq!(item.base_price, Decimal::new(4000, 2));
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        assert_eq!(serde_json::to_string(&ItemId(42)).unwrap(), "42");
        assert_eq!(ItemId(42).to_string(), "42");
    }
}
