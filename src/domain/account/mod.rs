// ============================================================================
// Account Domain - Users and Roles
// ============================================================================
//
// Identity records only. Authentication mechanics (hashing policy, token
// issuance) live outside this crate; the API surface resolves a caller to
// one of these records before the engine is ever invoked.
//
// ============================================================================

pub mod errors;
pub mod user;

// Re-export for convenience
pub use errors::*;
pub use user::*;
