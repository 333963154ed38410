// ============================================================================
// Store Layer - In-Process Document Store
// ============================================================================
//
// A single explicit store handle, passed to the engine and reporting layers
// at construction. Writes go through `MemoryStore::transaction`, which
// commits a working copy only when the closure succeeds, so every engine
// operation is all-or-nothing across orders, products, and the audit log.
//
// ============================================================================

pub mod memory;

// Re-export for convenience
pub use memory::*;
