use uuid::Uuid;

use super::model::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order must contain at least one line")]
    EmptyOrder,

    #[error("Invalid line quantity: {0}")]
    InvalidQuantity(i64),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: u32,
        available: u32,
    },

    #[error("Order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("Order cannot be modified in status: {0:?}")]
    OrderNotMutable(OrderStatus),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order {order_id} has no line for product {product_id}")]
    LineNotFound { order_id: Uuid, product_id: Uuid },

    #[error("Owner user not found: {0}")]
    OwnerNotFound(Uuid),
}

impl OrderError {
    /// Stable machine-readable kind, used by the API error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyOrder => "empty_order",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::ProductNotFound(_) => "product_not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::OrderNotFound(_) => "order_not_found",
            Self::OrderNotMutable(_) => "order_not_mutable",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::LineNotFound { .. } => "line_not_found",
            Self::OwnerNotFound(_) => "owner_not_found",
        }
    }
}
