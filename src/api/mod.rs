use std::sync::Arc;

use actix::Addr;
use actix_web::{web, HttpResponse, Responder};

use crate::engine::OrderEngineActor;
use crate::reporting::ReportingEngine;
use crate::store::MemoryStore;

// ============================================================================
// API Surface - HTTP Translation Layer
// ============================================================================
//
// Thin request/response translation over the engine, stores, and reporting:
// explicit request schemas, pagination, the response envelope, and the
// identity gate. No business rule lives here; every invariant is enforced
// by the engine inside its own transaction.
//
// ============================================================================

pub mod analytics;
pub mod error;
pub mod identity;
pub mod orders;
pub mod pagination;
pub mod products;
pub mod users;

pub use error::ApiError;

/// Shared handler state, built once in main and injected everywhere.
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub engine: Addr<OrderEngineActor>,
    pub reports: ReportingEngine,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health))
            .service(
                web::scope("/products")
                    .route("", web::get().to(products::list))
                    .route("", web::post().to(products::create))
                    .route("/{id}", web::get().to(products::get))
                    .route("/{id}", web::put().to(products::update))
                    .route("/{id}", web::delete().to(products::delete)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(orders::create))
                    .route("", web::get().to(orders::list))
                    .route("/my", web::get().to(orders::list_mine))
                    .route("/{id}", web::get().to(orders::get))
                    .route("/{id}", web::delete().to(orders::delete))
                    .route("/{id}/items", web::post().to(orders::add_item))
                    .route("/{id}/items/{product_id}", web::delete().to(orders::remove_item))
                    .route("/{id}/status", web::put().to(orders::update_status))
                    .route("/{id}/cancel", web::put().to(orders::cancel))
                    .route("/{id}/events", web::get().to(orders::events)),
            )
            .service(
                web::scope("/users")
                    .route("", web::post().to(users::register))
                    .route("", web::get().to(users::list)),
            )
            .service(
                web::scope("/analytics")
                    .route("/top-products", web::get().to(analytics::top_products))
                    .route("/revenue-by-country", web::get().to(analytics::revenue_by_country))
                    .route("/revenue-by-month", web::get().to(analytics::revenue_by_month))
                    .route("/customer-segments", web::get().to(analytics::customer_segments))
                    .route("/inventory-turnover", web::get().to(analytics::inventory_turnover)),
            ),
    );
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": "OK",
        "service": "order-engine"
    }))
}

// ============================================================================
// Integration Tests
// ============================================================================
