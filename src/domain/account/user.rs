use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AccountError;

// ============================================================================
// User - Account Model
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,

    /// Opaque credential hash. Hashing policy is owned by the caller.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: Role,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        country: impl Into<String>,
    ) -> Result<Self, AccountError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(AccountError::EmptyEmail);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password_hash: password_hash.into(),
            role,
            country: country.into(),
            created_at: Utc::now(),
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("alice@example.com", "hash", Role::User, "France").unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.is_admin());
    }

    #[test]
    fn test_user_rejects_empty_email() {
        let err = User::new(" ", "hash", Role::User, "France").unwrap_err();
        assert!(matches!(err, AccountError::EmptyEmail));
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("bob@example.com", "secret-hash", Role::Admin, "UK").unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("admin"));
    }
}
