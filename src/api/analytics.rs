use actix_web::{web, HttpResponse};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use super::identity::Identity;
use super::{ApiError, AppState};

// ============================================================================
// Analytics Handlers - Reporting Endpoints (Admin Only)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

pub async fn top_products(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let data = state.reports.top_products(query.limit);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": data })))
}

pub async fn revenue_by_country(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let data = state.reports.revenue_by_country(query.limit);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": data })))
}

pub async fn revenue_by_month(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<YearQuery>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let data = state.reports.revenue_by_month(year);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "year": year, "data": data })))
}

pub async fn customer_segments(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let data = state.reports.customer_segments();
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": data })))
}

pub async fn inventory_turnover(
    state: web::Data<AppState>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let data = state.reports.inventory_turnover(Utc::now());
    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": data })))
}
