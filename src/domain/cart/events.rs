use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::event_sourcing::core::DomainEvent;
use super::value_objects::{AddressId, CustomerId, ItemId, MenuItem, PriceId, RestaurantId};

// ============================================================================
// Cart Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    Opened(CartOpened),
    RestaurantSelected(RestaurantSelected),
    ItemAdded(ItemAdded),
    UnitRemoved(UnitRemoved),
    QuantityAdjusted(QuantityAdjusted),
    PriceSelected(PriceSelected),
    CustomerAssigned(CustomerAssigned),
    AddressAssigned(AddressAssigned),
    Cleared(CartCleared),
    SubmissionStarted(SubmissionStarted),
    Submitted(OrderSubmitted),
    SubmissionFailed(SubmissionFailed),
}

impl DomainEvent for CartEvent {
    fn event_type() -> &'static str { "CartEvent" }

    fn variant_name(&self) -> &'static str {
        match self {
            CartEvent::Opened(_) => "CartOpened",
            CartEvent::RestaurantSelected(_) => "RestaurantSelected",
            CartEvent::ItemAdded(_) => "ItemAdded",
            CartEvent::UnitRemoved(_) => "UnitRemoved",
            CartEvent::QuantityAdjusted(_) => "QuantityAdjusted",
            CartEvent::PriceSelected(_) => "PriceSelected",
            CartEvent::CustomerAssigned(_) => "CustomerAssigned",
            CartEvent::AddressAssigned(_) => "AddressAssigned",
            CartEvent::Cleared(_) => "CartCleared",
            CartEvent::SubmissionStarted(_) => "SubmissionStarted",
            CartEvent::Submitted(_) => "OrderSubmitted",
            CartEvent::SubmissionFailed(_) => "SubmissionFailed",
        }
    }
}

/// Cart created empty for the first selected restaurant
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CartOpened {
    pub cart_id: Uuid,
    pub restaurant_id: RestaurantId,
}

/// A different restaurant was selected, previous lines are discarded
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RestaurantSelected {
    pub restaurant_id: RestaurantId,
}

/// The menu descriptor is kept whole so replay does not depend on the menu
/// provider still serving the same data
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ItemAdded {
    pub item: MenuItem,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UnitRemoved {
    pub item_id: ItemId,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QuantityAdjusted {
    pub item_id: ItemId,
    pub delta: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PriceSelected {
    pub item_id: ItemId,
    pub price_id: PriceId,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CustomerAssigned {
    pub customer_id: CustomerId,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AddressAssigned {
    pub address_id: AddressId,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CartCleared {}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubmissionStarted {
    pub started_at: DateTime<Utc>,
}

/// Order accepted by the order API, the cart is discarded
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderSubmitted {
    pub order_id: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubmissionFailed {
    pub reason: String,
}
