// ============================================================================
// Account Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("User not found: {0}")]
    UserNotFound(uuid::Uuid),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Email cannot be empty")]
    EmptyEmail,
}
