// ============================================================================
// Order Domain - Orders, Lines, Lifecycle
// ============================================================================
//
// This module contains all order-specific code:
// - Model (Order, OrderLine, OrderStatus with its transition rules)
// - Events (audit records appended with every committed mutation)
// - Errors (OrderError enum)
//
// The model enforces the in-memory invariants (derived total, legal status
// transitions); stock coupling lives in the engine, which mutates orders and
// products inside one store transaction.
//
// ============================================================================

pub mod errors;
pub mod events;
pub mod model;

// Re-export for convenience
pub use errors::*;
pub use events::*;
pub use model::*;
