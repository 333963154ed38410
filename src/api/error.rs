use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::domain::account::AccountError;
use crate::domain::catalog::CatalogError;
use crate::domain::order::OrderError;

// ============================================================================
// API Error Envelope
// ============================================================================
//
// Taxonomy: validation (400), not-found (404), conflict (409), authorization
// (401/403). Every domain error maps to a stable machine-readable kind plus
// a human-readable message; callers never see a half-applied mutation behind
// any of these.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn validation(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind,
            message: message.into(),
        }
    }

    pub fn conflict(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            kind: "unauthorized",
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            kind: "forbidden",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal",
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(serde_json::json!({
            "success": false,
            "error": self.kind,
            "message": self.message,
        }))
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        let message = e.to_string();
        let kind = e.kind();
        match e {
            OrderError::EmptyOrder | OrderError::InvalidQuantity(_) => {
                Self::validation(kind, message)
            }
            OrderError::ProductNotFound(_)
            | OrderError::OrderNotFound(_)
            | OrderError::LineNotFound { .. }
            | OrderError::OwnerNotFound(_) => Self::not_found(kind, message),
            OrderError::InsufficientStock { .. }
            | OrderError::OrderNotMutable(_)
            | OrderError::InvalidTransition { .. } => Self::conflict(kind, message),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        let message = e.to_string();
        match e {
            CatalogError::ProductNotFound(_) => Self::not_found("product_not_found", message),
            CatalogError::DuplicateCode(_) => Self::conflict("duplicate_code", message),
            CatalogError::NegativePrice | CatalogError::EmptyCode | CatalogError::EmptyName => {
                Self::validation("invalid_product", message)
            }
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        let message = e.to_string();
        match e {
            AccountError::UserNotFound(_) => Self::not_found("user_not_found", message),
            AccountError::DuplicateEmail(_) => Self::conflict("duplicate_email", message),
            AccountError::EmptyEmail => Self::validation("invalid_user", message),
        }
    }
}

impl From<actix::MailboxError> for ApiError {
    fn from(e: actix::MailboxError) -> Self {
        Self::internal(format!("Engine unavailable: {e}"))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
