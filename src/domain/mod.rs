// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Domain aggregates live here, separate from the event sourcing
// infrastructure in src/event_sourcing/.
//
// ============================================================================

pub mod cart;
