// ============================================================================
// Order Aggregation Engine
// ============================================================================
//
// Owns the stock-decrement/restore invariant and the derived-total
// invariant. Every operation runs as one store transaction spanning the
// order write, the product stock writes, and the audit record: either all
// of it commits or none of it does.
//
// The engine itself is synchronous; `actor.rs` wraps it in an actix actor
// whose mailbox serializes mutations, so two concurrent creations can never
// interleave their stock checks.
//
// ============================================================================

pub mod actor;
pub mod core;

// Re-export for convenience
pub use actor::*;
pub use core::*;
