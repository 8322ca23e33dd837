use chrono::Utc;
use uuid::Uuid;

use crate::event_sourcing::core::Aggregate;
use super::state::Cart;
use super::commands::CartCommand;
use super::errors::CartError;
use super::events::*;
use super::pricing::{compute_totals, PricingPolicy, Totals};
use super::value_objects::{AddressId, CartStatus, CustomerId};

// ============================================================================
// Cart Aggregate - manual order being assembled by an operator
// ============================================================================

#[derive(Debug, Clone)]
pub struct CartAggregate {
    pub id: Uuid,
    pub version: i64,

    pub cart: Cart,
    pub status: CartStatus,
    pub customer_id: Option<CustomerId>,
    pub address_id: Option<AddressId>,

    /// Order id returned by the last successful submission
    pub last_order_id: Option<String>,
    /// Reason of the last failed submission, cleared on the next attempt
    pub last_failure: Option<String>,
}

impl CartAggregate {
    /// Events opening a brand new cart. Only `OpenCart` is valid here.
    pub fn open(command: &CartCommand) -> Result<Vec<CartEvent>, CartError> {
        match command {
            CartCommand::OpenCart { cart_id, restaurant_id } => {
                Ok(vec![CartEvent::Opened(CartOpened {
                    cart_id: *cart_id,
                    restaurant_id: *restaurant_id,
                })])
            }
            _ => Err(CartError::NotInitialized),
        }
    }

    pub fn totals(&self, policy: &PricingPolicy) -> Totals {
        compute_totals(&self.cart, policy)
    }

    /// Input gating performed before any order request is built
    pub fn validate_submittable(&self) -> Result<(), CartError> {
        if self.cart.restaurant().is_none() {
            return Err(CartError::NoRestaurant);
        }
        if self.cart.is_empty() {
            return Err(CartError::EmptyCart);
        }
        if self.customer_id.is_none() {
            return Err(CartError::NoCustomer);
        }
        if self.address_id.is_none() {
            return Err(CartError::NoAddress);
        }
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), CartError> {
        match self.status {
            CartStatus::Open => Ok(()),
            CartStatus::Submitting => Err(CartError::SubmissionInFlight),
        }
    }

    fn ensure_submitting(&self) -> Result<(), CartError> {
        match self.status {
            CartStatus::Submitting => Ok(()),
            CartStatus::Open => Err(CartError::NoSubmissionInFlight),
        }
    }
}

impl Aggregate for CartAggregate {
    type Event = CartEvent;
    type Command = CartCommand;
    type Error = CartError;

    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            CartEvent::Opened(e) => Ok(Self {
                id: e.cart_id,
                version: 1,
                cart: Cart::for_restaurant(e.restaurant_id),
                status: CartStatus::Open,
                customer_id: None,
                address_id: None,
                last_order_id: None,
                last_failure: None,
            }),
            _ => Err(CartError::NotInitialized),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            CartEvent::Opened(_) => return Err(CartError::AlreadyOpen),
            CartEvent::RestaurantSelected(e) => {
                self.cart = self.cart.select_restaurant(e.restaurant_id);
            }
            CartEvent::ItemAdded(e) => {
                self.cart = self.cart.add_item(&e.item);
            }
            CartEvent::UnitRemoved(e) => {
                self.cart = self.cart.remove_one(e.item_id);
            }
            CartEvent::QuantityAdjusted(e) => {
                self.cart = self.cart.adjust_quantity(e.item_id, e.delta);
            }
            CartEvent::PriceSelected(e) => {
                self.cart = self.cart.select_price(e.item_id, e.price_id);
            }
            CartEvent::CustomerAssigned(e) => {
                self.customer_id = Some(e.customer_id);
            }
            CartEvent::AddressAssigned(e) => {
                self.address_id = Some(e.address_id);
            }
            CartEvent::Cleared(_) => {
                self.cart = self.cart.clear();
            }
            CartEvent::SubmissionStarted(_) => {
                if self.status != CartStatus::Open {
                    return Err(CartError::InvalidStatusTransition(self.status));
                }
                self.status = CartStatus::Submitting;
                self.last_failure = None;
            }
            CartEvent::Submitted(e) => {
                // The submitted cart is discarded; the operator starts over
                self.cart = Cart::default();
                self.customer_id = None;
                self.address_id = None;
                self.status = CartStatus::Open;
                self.last_order_id = Some(e.order_id.clone());
            }
            CartEvent::SubmissionFailed(e) => {
                self.status = CartStatus::Open;
                self.last_failure = Some(e.reason.clone());
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::OpenCart { .. } => Err(CartError::AlreadyOpen),

            CartCommand::SelectRestaurant { restaurant_id } => {
                self.ensure_editable()?;
                if self.cart.restaurant() == Some(*restaurant_id) {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::RestaurantSelected(RestaurantSelected {
                    restaurant_id: *restaurant_id,
                })])
            }

            CartCommand::AddItem { item } => {
                self.ensure_editable()?;
                Ok(vec![CartEvent::ItemAdded(ItemAdded { item: item.clone() })])
            }

            CartCommand::RemoveOne { item_id } => {
                self.ensure_editable()?;
                if self.cart.line(*item_id).is_none() {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::UnitRemoved(UnitRemoved { item_id: *item_id })])
            }

            CartCommand::AdjustQuantity { item_id, delta } => {
                self.ensure_editable()?;
                if *delta == 0 || self.cart.line(*item_id).is_none() {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::QuantityAdjusted(QuantityAdjusted {
                    item_id: *item_id,
                    delta: *delta,
                })])
            }

            CartCommand::SelectPrice { item_id, price_id } => {
                self.ensure_editable()?;
                let offered = self.cart.line(*item_id).is_some_and(|line| {
                    line.selected_price.price_id() != Some(*price_id)
                        && line.variants.iter().any(|v| v.id == *price_id)
                });
                if !offered {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::PriceSelected(PriceSelected {
                    item_id: *item_id,
                    price_id: *price_id,
                })])
            }

            CartCommand::AssignCustomer { customer_id } => {
                self.ensure_editable()?;
                if self.customer_id == Some(*customer_id) {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::CustomerAssigned(CustomerAssigned {
                    customer_id: *customer_id,
                })])
            }

            CartCommand::AssignAddress { address_id } => {
                self.ensure_editable()?;
                if self.address_id == Some(*address_id) {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::AddressAssigned(AddressAssigned {
                    address_id: *address_id,
                })])
            }

            CartCommand::ClearCart => {
                self.ensure_editable()?;
                if self.cart.is_empty() {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::Cleared(CartCleared {})])
            }

            CartCommand::BeginSubmission => {
                self.ensure_editable()?;
                self.validate_submittable()?;
                Ok(vec![CartEvent::SubmissionStarted(SubmissionStarted {
                    started_at: Utc::now(),
                })])
            }

            CartCommand::CompleteSubmission { order_id } => {
                self.ensure_submitting()?;
                Ok(vec![CartEvent::Submitted(OrderSubmitted {
                    order_id: order_id.clone(),
                    submitted_at: Utc::now(),
                })])
            }

            CartCommand::FailSubmission { reason } => {
                self.ensure_submitting()?;
                Ok(vec![CartEvent::SubmissionFailed(SubmissionFailed {
                    reason: reason.clone(),
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
