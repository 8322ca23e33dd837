use uuid::Uuid;
use super::value_objects::{AddressId, CustomerId, ItemId, MenuItem, PriceId, RestaurantId};

// ============================================================================
// Cart Commands - operator intent on the create-order screen
// ============================================================================

#[derive(Debug, Clone)]
pub enum CartCommand {
    OpenCart {
        cart_id: Uuid,
        restaurant_id: RestaurantId,
    },
    SelectRestaurant {
        restaurant_id: RestaurantId,
    },
    AddItem {
        item: MenuItem,
    },
    RemoveOne {
        item_id: ItemId,
    },
    AdjustQuantity {
        item_id: ItemId,
        delta: i64,
    },
    SelectPrice {
        item_id: ItemId,
        price_id: PriceId,
    },
    AssignCustomer {
        customer_id: CustomerId,
    },
    AssignAddress {
        address_id: AddressId,
    },
    ClearCart,
    BeginSubmission,
    CompleteSubmission {
        order_id: String,
    },
    FailSubmission {
        reason: String,
    },
}
