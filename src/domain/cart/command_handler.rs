use std::sync::Arc;
use uuid::Uuid;
use anyhow::{Result, bail};

use crate::event_sourcing::core::{Aggregate, DomainEvent, EventEnvelope};
use crate::event_sourcing::store::InMemoryEventStore;

use super::aggregate::CartAggregate;
use super::commands::CartCommand;
use super::events::CartEvent;
use super::pricing::{PricingPolicy, Totals};

// ============================================================================
// Cart Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Event Store
//
// ============================================================================

#[derive(Debug)]
pub struct CartCommandHandler {
    event_store: Arc<InMemoryEventStore<CartEvent>>,
    policy: PricingPolicy,
}

impl CartCommandHandler {
    pub fn new(event_store: Arc<InMemoryEventStore<CartEvent>>, policy: PricingPolicy) -> Self {
        Self { event_store, policy }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Handle a command and persist resulting events.
    /// Returns the cart version after the command.
    pub async fn handle(
        &self,
        aggregate_id: Uuid,
        command: CartCommand,
        correlation_id: Uuid,
    ) -> Result<i64> {
        let (expected_version, domain_events) = if self.event_store.aggregate_exists(aggregate_id).await? {
            let aggregate = self.load(aggregate_id).await?;
            let events = aggregate.handle_command(&command)
                .map_err(|e| anyhow::anyhow!("Command failed: {}", e))?;
            (aggregate.version(), events)
        } else {
            match &command {
                CartCommand::OpenCart { cart_id, .. } if *cart_id != aggregate_id => {
                    bail!("Cart id {} does not match aggregate id {}", cart_id, aggregate_id)
                }
                CartCommand::OpenCart { .. } => {}
                _ => bail!("Cart does not exist: {}", aggregate_id),
            }
            let events = CartAggregate::open(&command)
                .map_err(|e| anyhow::anyhow!("Command failed: {}", e))?;
            (0, events)
        };

        if domain_events.is_empty() {
            tracing::debug!(cart_id = %aggregate_id, ?command, "Command produced no events");
            return Ok(expected_version);
        }

        let envelopes: Vec<_> = domain_events
            .into_iter()
            .zip(expected_version + 1..)
            .map(|(domain_event, seq)| {
                EventEnvelope::new(
                    aggregate_id,
                    seq,
                    domain_event.variant_name().to_string(),
                    domain_event,
                    correlation_id,
                )
            })
            .collect();

        let new_version = self.event_store
            .append_events(aggregate_id, expected_version, envelopes)
            .await?;

        Ok(new_version)
    }

    pub async fn load(&self, aggregate_id: Uuid) -> Result<CartAggregate> {
        self.event_store.load_aggregate::<CartAggregate>(aggregate_id).await
    }

    /// Totals of the cart as it stands now, computed fresh from its history
    pub async fn totals(&self, aggregate_id: Uuid) -> Result<Totals> {
        let aggregate = self.load(aggregate_id).await?;
        Ok(aggregate.totals(&self.policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use crate::domain::cart::value_objects::{ItemId, MenuItem, RestaurantId};

    fn handler() -> CartCommandHandler {
        CartCommandHandler::new(
            Arc::new(InMemoryEventStore::new("Cart")),
            PricingPolicy::default(),
        )
    }

    fn item_a() -> MenuItem {
        MenuItem::new(1, "Butter Chicken", Decimal::new(23000, 2))
    }

    async fn opened(handler: &CartCommandHandler) -> Uuid {
        let cart_id = Uuid::new_v4();
        handler
            .handle(cart_id, CartCommand::OpenCart { cart_id, restaurant_id: RestaurantId(1) }, Uuid::new_v4())
            .await
            .unwrap();
        cart_id
    }

    #[tokio::test]
    async fn test_open_and_mutate() {
        let handler = handler();
        let cart_id = opened(&handler).await;

        let v = handler.handle(cart_id, CartCommand::AddItem { item: item_a() }, Uuid::new_v4()).await.unwrap();
        assert_eq!(v, 2);

        let totals = handler.totals(cart_id).await.unwrap();
        assert_eq!(totals.subtotal, Decimal::new(23000, 2));
        assert_eq!(totals.total, Decimal::new(29150, 2));
    }

    #[tokio::test]
    async fn test_command_on_unknown_cart_fails() {
        let handler = handler();
        let result = handler
            .handle(Uuid::new_v4(), CartCommand::AddItem { item: item_a() }, Uuid::new_v4())
            .await;
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_open_with_mismatched_id_fails() {
        let handler = handler();
        let result = handler
            .handle(
                Uuid::new_v4(),
                CartCommand::OpenCart { cart_id: Uuid::new_v4(), restaurant_id: RestaurantId(1) },
                Uuid::new_v4(),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_noop_command_keeps_version() {
        let handler = handler();
        let cart_id = opened(&handler).await;

        let v = handler
            .handle(cart_id, CartCommand::RemoveOne { item_id: ItemId(9) }, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(v, 1);
    }

    #[tokio::test]
    async fn test_rejected_command_surfaces_business_error() {
        let handler = handler();
        let cart_id = opened(&handler).await;

        let result = handler.handle(cart_id, CartCommand::BeginSubmission, Uuid::new_v4()).await;
        assert!(result.unwrap_err().to_string().contains("Cart is empty"));
    }

    #[tokio::test]
    async fn test_event_types_recorded_per_variant() {
        let store = Arc::new(InMemoryEventStore::new("Cart"));
        let handler = CartCommandHandler::new(store.clone(), PricingPolicy::default());
        let cart_id = opened(&handler).await;
        handler.handle(cart_id, CartCommand::AddItem { item: item_a() }, Uuid::new_v4()).await.unwrap();

        let types: Vec<String> = store
            .load_events(cart_id)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(types, vec!["CartOpened".to_string(), "ItemAdded".to_string()]);
    }
}
