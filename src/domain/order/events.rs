use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{OrderLine, OrderStatus};

// ============================================================================
// Order Events - Audit Trail
// ============================================================================
//
// One record is appended per committed engine mutation, in the same store
// transaction as the mutation itself. A failed operation leaves no record.
//
// ============================================================================

/// Union type for all order audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Created(OrderCreated),
    ItemAdded(OrderItemAdded),
    ItemRemoved(OrderItemRemoved),
    StatusChanged(OrderStatusChanged),
    Deleted(OrderDeleted),
}

impl OrderEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Created(_) => "OrderCreated",
            Self::ItemAdded(_) => "OrderItemAdded",
            Self::ItemRemoved(_) => "OrderItemRemoved",
            Self::StatusChanged(_) => "OrderStatusChanged",
            Self::Deleted(_) => "OrderDeleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    pub owner_user_id: Uuid,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemAdded {
    pub line: OrderLine,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRemoved {
    pub product_id: Uuid,
    pub removed_units: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Units returned to the catalog, present only on cancellation.
    pub restored_units: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDeleted {
    pub deleted_by: Uuid,
}

/// Envelope persisted to the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEventRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event: OrderEvent,
}

impl OrderEventRecord {
    pub fn new(order_id: Uuid, event: OrderEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            occurred_at: Utc::now(),
            event,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
