use actix::prelude::*;
use uuid::Uuid;

use crate::domain::order::{Order, OrderError, OrderStatus};

use super::core::{LineRequest, OrderEngine};

// ============================================================================
// Actor Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "Result<Order, OrderError>")]
pub struct CreateOrder {
    pub owner_user_id: Uuid,
    pub lines: Vec<LineRequest>,
}

#[derive(Message)]
#[rtype(result = "Result<Order, OrderError>")]
pub struct AddItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Message)]
#[rtype(result = "Result<Order, OrderError>")]
pub struct RemoveItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "Result<Order, OrderError>")]
pub struct UpdateStatus {
    pub order_id: Uuid,
    pub status: OrderStatus,
}

#[derive(Message)]
#[rtype(result = "Result<(), OrderError>")]
pub struct DeleteOrder {
    pub order_id: Uuid,
    pub deleted_by: Uuid,
}

// ============================================================================
// Order Engine Actor - Serializes all order mutations
// ============================================================================
//
// The actor mailbox processes one message at a time, so two concurrent
// creations against the same product cannot interleave their stock
// check-and-decrement: no lost update, no negative stock.
//
// ============================================================================

pub struct OrderEngineActor {
    engine: OrderEngine,
}

impl OrderEngineActor {
    pub fn new(engine: OrderEngine) -> Self {
        Self { engine }
    }
}

impl Actor for OrderEngineActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        tracing::info!("OrderEngineActor started");
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<CreateOrder> for OrderEngineActor {
    type Result = Result<Order, OrderError>;

    fn handle(&mut self, msg: CreateOrder, _: &mut Self::Context) -> Self::Result {
        self.engine.create_order(msg.owner_user_id, &msg.lines)
    }
}

impl Handler<AddItem> for OrderEngineActor {
    type Result = Result<Order, OrderError>;

    fn handle(&mut self, msg: AddItem, _: &mut Self::Context) -> Self::Result {
        self.engine.add_item(msg.order_id, msg.product_id, msg.quantity)
    }
}

impl Handler<RemoveItem> for OrderEngineActor {
    type Result = Result<Order, OrderError>;

    fn handle(&mut self, msg: RemoveItem, _: &mut Self::Context) -> Self::Result {
        self.engine.remove_item(msg.order_id, msg.product_id)
    }
}

impl Handler<UpdateStatus> for OrderEngineActor {
    type Result = Result<Order, OrderError>;

    fn handle(&mut self, msg: UpdateStatus, _: &mut Self::Context) -> Self::Result {
        self.engine.update_status(msg.order_id, msg.status)
    }
}

impl Handler<DeleteOrder> for OrderEngineActor {
    type Result = Result<(), OrderError>;

    fn handle(&mut self, msg: DeleteOrder, _: &mut Self::Context) -> Self::Result {
        self.engine.delete_order(msg.order_id, msg.deleted_by)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
