// ============================================================================
// Cart Domain - manual order cart and its pricing
// ============================================================================
//
// - Value objects (MenuItem, CartLine, Price, ids)
// - Cart (owned state, snapshot-returning operations)
// - Pricing (PricingPolicy, Totals, compute_totals)
// - Events, Commands, Errors
// - Aggregate (CartAggregate, submission lifecycle)
// - Command Handler (CartCommandHandler)
// - Submission (OrderRequest, OrderGateway)
//
// ============================================================================

pub mod value_objects;
pub mod state;
pub mod pricing;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;
pub mod submission;

pub use value_objects::*;
pub use state::Cart;
pub use pricing::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
pub use submission::*;
