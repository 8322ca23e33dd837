// ============================================================================
// Event Sourcing Core
// ============================================================================
//
// Generic abstractions shared by every aggregate. Nothing cart-specific
// belongs here.
//
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::Aggregate;
pub use event::{DomainEvent, EventEnvelope, serialize_event, deserialize_event};
