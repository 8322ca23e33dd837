// ============================================================================
// Event Store
// ============================================================================

mod in_memory;

pub use in_memory::InMemoryEventStore;
