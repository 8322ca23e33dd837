use std::sync::Arc;
use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use manual_order::config::AppConfig;
use manual_order::domain::cart::{
    submit_cart, AddressId, CartCommand, CartCommandHandler, CustomerId, InMemoryOrderGateway,
    ItemId, MenuItem, PriceId, RestaurantId,
};
use manual_order::event_sourcing::InMemoryEventStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,manual_order=debug"))
        )
        .init();

    tracing::info!("Starting manual order session");

    let config = AppConfig::from_env()?;
    let store = Arc::new(InMemoryEventStore::new("Cart"));
    let handler = CartCommandHandler::new(store, config.pricing);
    let gateway = InMemoryOrderGateway::new();

    // Menu as the menu provider would hand it over
    let butter_chicken = MenuItem::new(1, "Butter Chicken", Decimal::new(23000, 2));
    let biryani = MenuItem::new(2, "Veg Biryani", Decimal::new(180, 0))
        .with_variant(201, "Half", Decimal::new(180, 0))
        .with_variant(202, "Full", Decimal::new(320, 0));
    let dosa = MenuItem::new(3, "Masala Dosa", Decimal::new(120, 0));

    let cart_id = Uuid::new_v4();
    let correlation_id = Uuid::new_v4();

    let session = vec![
        CartCommand::OpenCart { cart_id, restaurant_id: RestaurantId(12) },
        CartCommand::AddItem { item: dosa },
        CartCommand::AdjustQuantity { item_id: ItemId(3), delta: 2 },
    ];
    for command in session {
        handler.handle(cart_id, command, correlation_id).await?;
    }
    tracing::info!(cart_id = %cart_id, totals = %handler.totals(cart_id).await?, "Cart at first restaurant");

    // Switching restaurant drops everything picked so far
    let session = vec![
        CartCommand::SelectRestaurant { restaurant_id: RestaurantId(15) },
        CartCommand::AddItem { item: butter_chicken.clone() },
        CartCommand::AddItem { item: biryani },
        CartCommand::SelectPrice { item_id: ItemId(2), price_id: PriceId(202) },
        CartCommand::AddItem { item: butter_chicken },
        CartCommand::RemoveOne { item_id: ItemId(1) },
        CartCommand::AssignCustomer { customer_id: CustomerId(9001) },
        CartCommand::AssignAddress { address_id: AddressId(77) },
    ];
    for command in session {
        handler.handle(cart_id, command, correlation_id).await?;
    }
    tracing::info!(
        cart_id = %cart_id,
        currency = %config.currency,
        totals = %handler.totals(cart_id).await?,
        "Cart ready for submission"
    );

    let receipt = submit_cart(&handler, &gateway, cart_id).await?;

    for request in gateway.requests().await {
        tracing::info!(body = %serde_json::to_string(&request)?, "Order request sent");
    }
    tracing::info!(order_id = %receipt.order_id, "Manual order placed");

    Ok(())
}
