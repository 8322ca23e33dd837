use super::value_objects::CartStatus;

// ============================================================================
// Cart Business Rule Errors
// ============================================================================
//
// The cart operations themselves never fail. These errors come from the
// lifecycle around them: gating a submission and locking the cart while a
// submission is outstanding.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Select a restaurant")]
    NoRestaurant,

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Select a customer")]
    NoCustomer,

    #[error("Select a delivery address")]
    NoAddress,

    #[error("An order submission is already in progress")]
    SubmissionInFlight,

    #[error("No order submission is in progress")]
    NoSubmissionInFlight,

    #[error("Cart is already open")]
    AlreadyOpen,

    #[error("Cannot apply event in status: {0:?}")]
    InvalidStatusTransition(CartStatus),

    #[error("Aggregate not initialized")]
    NotInitialized,
}
