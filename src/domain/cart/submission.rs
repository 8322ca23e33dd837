use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::aggregate::CartAggregate;
use super::command_handler::CartCommandHandler;
use super::commands::CartCommand;
use super::errors::CartError;
use super::pricing::PricingPolicy;
use super::value_objects::{AddressId, CustomerId, ItemId, PriceId, RestaurantId};

// ============================================================================
// Order Submission
// ============================================================================
//
// Packages a cart into an order-creation request and sends it to the order
// API exactly once. The API itself lives outside this crate.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequestItem {
    pub item_id: ItemId,
    /// `None` for lines sold at the item's base price
    pub price_id: Option<PriceId>,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub restaurant_id: RestaurantId,
    pub customer_id: CustomerId,
    pub address_id: AddressId,
    pub items: Vec<OrderRequestItem>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub platform_fee: Decimal,
    pub total: Decimal,
}

impl OrderRequest {
    /// Read-only snapshot of a cart, gated the same way as `BeginSubmission`
    pub fn from_cart(aggregate: &CartAggregate, policy: &PricingPolicy) -> Result<Self, CartError> {
        aggregate.validate_submittable()?;

        let (Some(restaurant_id), Some(customer_id), Some(address_id)) = (
            aggregate.cart.restaurant(),
            aggregate.customer_id,
            aggregate.address_id,
        ) else {
            return Err(CartError::NoRestaurant);
        };

        let items = aggregate
            .cart
            .lines()
            .map(|line| OrderRequestItem {
                item_id: line.item_id,
                price_id: line.selected_price.price_id(),
                quantity: line.quantity,
            })
            .collect();

        let totals = aggregate.totals(policy).rounded();

        Ok(Self {
            restaurant_id,
            customer_id,
            address_id,
            items,
            subtotal: totals.subtotal,
            delivery_fee: totals.delivery_fee,
            platform_fee: totals.platform_fee,
            total: totals.total,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
}

/// Order-creation endpoint
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt>;
}

/// Gateway keeping every request in memory and numbering orders sequentially
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
    next_id: AtomicU64,
    requests: Mutex<Vec<OrderRequest>>,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn requests(&self) -> Vec<OrderRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt> {
        let seq = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.requests.lock().await.push(request.clone());

        let order_id = format!("ORD-{seq:06}");
        tracing::info!(order_id = %order_id, items = request.items.len(), total = %request.total, "Order accepted");
        Ok(OrderReceipt { order_id })
    }
}

/// Submit a cart: lock it, send one request, then record the outcome.
///
/// Gating failures are returned before the gateway is called. A gateway
/// failure unlocks the cart with its contents intact; it is not retried.
pub async fn submit_cart(
    handler: &CartCommandHandler,
    gateway: &dyn OrderGateway,
    cart_id: Uuid,
) -> Result<OrderReceipt> {
    let correlation_id = Uuid::new_v4();

    handler.handle(cart_id, CartCommand::BeginSubmission, correlation_id).await?;

    let aggregate = handler.load(cart_id).await?;
    let request = match OrderRequest::from_cart(&aggregate, handler.policy()) {
        Ok(request) => request,
        Err(e) => {
            handler
                .handle(cart_id, CartCommand::FailSubmission { reason: e.to_string() }, correlation_id)
                .await?;
            return Err(e.into());
        }
    };

    match gateway.create_order(&request).await {
        Ok(receipt) => {
            handler
                .handle(
                    cart_id,
                    CartCommand::CompleteSubmission { order_id: receipt.order_id.clone() },
                    correlation_id,
                )
                .await?;
            tracing::info!(cart_id = %cart_id, order_id = %receipt.order_id, "Cart submitted");
            Ok(receipt)
        }
        Err(e) => {
            tracing::warn!(cart_id = %cart_id, error = %e, "Order submission failed");
            handler
                .handle(cart_id, CartCommand::FailSubmission { reason: e.to_string() }, correlation_id)
                .await?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::domain::cart::value_objects::{CartStatus, MenuItem};
    use crate::event_sourcing::store::InMemoryEventStore;

    struct FailingGateway;

    #[async_trait]
    impl OrderGateway for FailingGateway {
        async fn create_order(&self, _request: &OrderRequest) -> Result<OrderReceipt> {
            anyhow::bail!("order API unavailable")
        }
    }

    fn handler() -> CartCommandHandler {
        CartCommandHandler::new(Arc::new(InMemoryEventStore::new("Cart")), PricingPolicy::default())
    }

    fn item_a() -> MenuItem {
        MenuItem::new(1, "Butter Chicken", Decimal::new(23000, 2))
    }

    fn pizza() -> MenuItem {
        MenuItem::new(2, "Margherita", Decimal::new(300, 0))
            .with_variant(21, "Regular", Decimal::new(250, 0))
    }

    async fn filled_cart(handler: &CartCommandHandler) -> Uuid {
        let cart_id = Uuid::new_v4();
        let commands = vec![
            CartCommand::OpenCart { cart_id, restaurant_id: RestaurantId(3) },
            CartCommand::AddItem { item: item_a() },
            CartCommand::AddItem { item: pizza() },
            CartCommand::AdjustQuantity { item_id: ItemId(2), delta: 1 },
            CartCommand::AssignCustomer { customer_id: CustomerId(40) },
            CartCommand::AssignAddress { address_id: AddressId(41) },
        ];
        for command in commands {
            handler.handle(cart_id, command, Uuid::new_v4()).await.unwrap();
        }
        cart_id
    }

    #[tokio::test]
    async fn test_submit_sends_one_request_and_discards_cart() {
        let handler = handler();
        let gateway = InMemoryOrderGateway::new();
        let cart_id = filled_cart(&handler).await;

        let receipt = submit_cart(&handler, &gateway, cart_id).await.unwrap();
        assert_eq!(receipt.order_id, "ORD-000001");

        let requests = gateway.requests().await;
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(
            request.items,
            vec![
                OrderRequestItem { item_id: ItemId(1), price_id: None, quantity: 1 },
                OrderRequestItem { item_id: ItemId(2), price_id: Some(PriceId(21)), quantity: 2 },
            ]
        );
        // 230 + 2 * 250 = 730, 5% = 36.50, + 50 delivery
        assert_eq!(request.subtotal, Decimal::new(730, 0));
        assert_eq!(request.platform_fee, Decimal::new(3650, 2));
        assert_eq!(request.total, Decimal::new(81650, 2));

        let aggregate = handler.load(cart_id).await.unwrap();
        assert!(aggregate.cart.is_empty());
        assert_eq!(aggregate.last_order_id.as_deref(), Some("ORD-000001"));
    }

    #[tokio::test]
    async fn test_gating_error_skips_gateway() {
        let handler = handler();
        let gateway = InMemoryOrderGateway::new();
        let cart_id = Uuid::new_v4();
        handler
            .handle(cart_id, CartCommand::OpenCart { cart_id, restaurant_id: RestaurantId(3) }, Uuid::new_v4())
            .await
            .unwrap();

        let result = submit_cart(&handler, &gateway, cart_id).await;
        assert!(result.unwrap_err().to_string().contains("Cart is empty"));
        assert!(gateway.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_cart_editable() {
        let handler = handler();
        let cart_id = filled_cart(&handler).await;

        let result = submit_cart(&handler, &FailingGateway, cart_id).await;
        assert!(result.is_err());

        let aggregate = handler.load(cart_id).await.unwrap();
        assert_eq!(aggregate.status, CartStatus::Open);
        assert_eq!(aggregate.cart.len(), 2);
        assert_eq!(aggregate.last_failure.as_deref(), Some("order API unavailable"));
    }

    #[test]
    fn test_request_wire_format() {
        let request = OrderRequest {
            restaurant_id: RestaurantId(3),
            customer_id: CustomerId(4),
            address_id: AddressId(5),
            items: vec![OrderRequestItem { item_id: ItemId(1), price_id: None, quantity: 2 }],
            subtotal: Decimal::new(46000, 2),
            delivery_fee: Decimal::new(5000, 2),
            platform_fee: Decimal::new(2300, 2),
            total: Decimal::new(53300, 2),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["restaurantId"], 3);
        assert_eq!(json["items"][0]["itemId"], 1);
        assert!(json["items"][0]["priceId"].is_null());
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["total"], "533.00");
    }
}
