// ============================================================================
// Catalog Domain - Products and Stock
// ============================================================================
//
// This module contains all catalog-specific code:
// - Product model (code, name, unit price, stock)
// - Errors (CatalogError enum)
//
// Stock is only mutated through the order engine's transactions; catalog
// administration touches name/price/stock-level directly.
//
// ============================================================================

pub mod errors;
pub mod product;

// Re-export for convenience
pub use errors::*;
pub use product::*;
