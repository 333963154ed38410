use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::catalog::{CatalogError, Product};

use super::identity::Identity;
use super::pagination::{paginate, PageQuery};
use super::{ApiError, AppState};

// ============================================================================
// Product Handlers - Catalog Administration
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub code: String,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub stock: Option<u32>,
}

pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let products = state.store.list_products();
    Ok(HttpResponse::Ok().json(paginate(products, &query)))
}

pub async fn get(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let product = state
        .store
        .find_product(id)
        .ok_or(CatalogError::ProductNotFound(id))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "product": product })))
}

pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let body = body.into_inner();

    let product = Product::new(body.code, body.name, body.unit_price, body.stock)?;
    state
        .store
        .transaction(|txn| txn.insert_product(product.clone()))?;

    tracing::info!(product_id = %product.id, code = %product.code, "Product created");
    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "product": product })))
}

pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let id = path.into_inner();
    let body = body.into_inner();

    let product = state.store.transaction(|txn| {
        let mut product = txn
            .product(id)
            .cloned()
            .ok_or(CatalogError::ProductNotFound(id))?;
        product.apply_update(body.name, body.unit_price, body.stock)?;
        txn.update_product(product.clone())?;
        Ok::<_, CatalogError>(product)
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "product": product })))
}

pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let id = path.into_inner();

    state.store.transaction(|txn| {
        txn.remove_product(id)
            .map(|_| ())
            .ok_or(CatalogError::ProductNotFound(id))
    })?;

    tracing::info!(product_id = %id, "Product deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
