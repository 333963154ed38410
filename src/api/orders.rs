use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::order::{OrderError, OrderStatus};
use crate::engine::{self, LineRequest};
use crate::store::OrderFilter;

use super::identity::Identity;
use super::pagination::{paginate, PageQuery};
use super::{ApiError, AppState};

// ============================================================================
// Order Handlers - Checkout and Lifecycle
// ============================================================================
//
// Every mutation goes through the engine actor; handlers only translate,
// authorize, and paginate.
//
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub lines: Vec<LineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<OrderStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, ApiError> {
    let order = state
        .engine
        .send(engine::CreateOrder {
            owner_user_id: identity.user_id(),
            lines: body.into_inner().lines,
        })
        .await??;

    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "order": order })))
}

pub async fn list(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let filter = OrderFilter {
        status: query.status,
        owner_user_id: None,
        created_after: query.start_date,
        created_before: query.end_date,
    };
    let orders = state.store.list_orders(&filter);
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    Ok(HttpResponse::Ok().json(paginate(orders, &page)))
}

pub async fn list_mine(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let filter = OrderFilter {
        owner_user_id: Some(identity.user_id()),
        ..Default::default()
    };
    let orders = state.store.list_orders(&filter);
    Ok(HttpResponse::Ok().json(paginate(orders, &query)))
}

pub async fn get(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let order = state.store.find_order(id).ok_or(OrderError::OrderNotFound(id))?;
    identity.require_owner_or_admin(order.owner_user_id)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "order": order })))
}

pub async fn add_item(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<AddItemRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = state.store.find_order(id).ok_or(OrderError::OrderNotFound(id))?;
    identity.require_owner_or_admin(existing.owner_user_id)?;

    let body = body.into_inner();
    let order = state
        .engine
        .send(engine::AddItem {
            order_id: id,
            product_id: body.product_id,
            quantity: body.quantity,
        })
        .await??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "order": order })))
}

pub async fn remove_item(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (order_id, product_id) = path.into_inner();
    let existing = state
        .store
        .find_order(order_id)
        .ok_or(OrderError::OrderNotFound(order_id))?;
    identity.require_owner_or_admin(existing.owner_user_id)?;

    let order = state
        .engine
        .send(engine::RemoveItem {
            order_id,
            product_id,
        })
        .await??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "order": order })))
}

pub async fn update_status(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let order = state
        .engine
        .send(engine::UpdateStatus {
            order_id: path.into_inner(),
            status: body.into_inner().status,
        })
        .await??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "order": order })))
}

pub async fn cancel(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let existing = state.store.find_order(id).ok_or(OrderError::OrderNotFound(id))?;
    identity.require_owner_or_admin(existing.owner_user_id)?;

    // Cancelling a paid order is an admin override; owners may only cancel
    // while the order is still pending.
    if existing.status == OrderStatus::Paid && !identity.user.is_admin() {
        return Err(ApiError::forbidden("Only pending orders can be cancelled"));
    }

    let order = state
        .engine
        .send(engine::UpdateStatus {
            order_id: id,
            status: OrderStatus::Cancelled,
        })
        .await??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "order": order })))
}

pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let id = path.into_inner();

    state
        .engine
        .send(engine::DeleteOrder {
            order_id: id,
            deleted_by: identity.user_id(),
        })
        .await??;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}

pub async fn events(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let id = path.into_inner();

    let events = state.store.order_events_for(id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "events": events })))
}
