// ============================================================================
// Catalog Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    ProductNotFound(uuid::Uuid),

    #[error("Product code already exists: {0}")]
    DuplicateCode(String),

    #[error("Unit price cannot be negative")]
    NegativePrice,

    #[error("Product code cannot be empty")]
    EmptyCode,

    #[error("Product name cannot be empty")]
    EmptyName,
}
