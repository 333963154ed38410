// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// This module contains the domain model for the commerce core.
// Each area has its own subdirectory with:
// - Model types (Product, Order, User)
// - Events (order audit trail)
// - Errors (typed business rule violations)
//
// This layer is completely separate from storage and HTTP concerns.
//
// ============================================================================

pub mod account;
pub mod catalog;
pub mod order;
