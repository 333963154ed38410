use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::domain::account::User;

use super::{ApiError, AppState};

// ============================================================================
// Identity Gate
// ============================================================================
//
// Token mechanics are out of scope: a caller is identified by the
// `X-User-Id` header resolved against the account store. Role and ownership
// checks happen here, before the engine is invoked; the engine never
// re-checks identity.
//
// ============================================================================

const USER_HEADER: &str = "x-user-id";

pub struct Identity {
    pub user: User,
}

impl Identity {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// Admin-only routes call this first.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.user.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin role required"))
        }
    }

    /// Resource is visible to its owner and to admins.
    pub fn require_owner_or_admin(&self, owner_user_id: Uuid) -> Result<(), ApiError> {
        if self.user.is_admin() || self.user.id == owner_user_id {
            Ok(())
        } else {
            Err(ApiError::forbidden("Not authorized to access this order"))
        }
    }
}

fn resolve(req: &HttpRequest) -> Result<Identity, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::internal("Application state missing"))?;

    let raw = req
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing X-User-Id header"))?;

    let user_id = Uuid::parse_str(raw)
        .map_err(|_| ApiError::unauthorized("Malformed X-User-Id header"))?;

    let user = state
        .store
        .find_user(user_id)
        .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

    Ok(Identity { user })
}

impl FromRequest for Identity {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}
