use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::account::{Role, User};

use super::identity::Identity;
use super::pagination::{paginate, PageQuery};
use super::{ApiError, AppState};

// ============================================================================
// User Handlers - Registration and Listing
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    /// Stored opaquely; credential hashing policy is owned by the caller
    /// of this service, not by the engine.
    pub password_hash: String,
    #[serde(default)]
    pub country: String,
}

pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let body = body.into_inner();
    let user = User::new(body.email, body.password_hash, Role::User, body.country)?;
    state.store.transaction(|txn| txn.insert_user(user.clone()))?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(HttpResponse::Created().json(serde_json::json!({ "success": true, "user": user })))
}

pub async fn list(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let users = state.store.list_users();
    Ok(HttpResponse::Ok().json(paginate(users, &query)))
}
