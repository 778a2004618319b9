/// User account entity
///
/// Accounts are managed by the auth collaborator; the core only needs the
/// identity and display fields, plus the validation applied at registration
/// time before the account and its points ledger are created together.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, UserId};

/// A registered user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user from existing data (used when loading from the database)
    pub fn from_existing(
        id: UserId,
        username: String,
        email: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            created_at,
        }
    }

    /// Validate a username before registration
    pub fn validate_username(username: &str) -> Result<(), DomainError> {
        let trimmed = username.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidUsername(
                "Username cannot be empty".to_string(),
            ));
        }

        if trimmed.len() > 50 {
            return Err(DomainError::InvalidUsername(
                "Username cannot be longer than 50 characters".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate an email address before registration
    ///
    /// Deliberately shallow: deliverability is the auth collaborator's
    /// problem, this only rejects obviously malformed values.
    pub fn validate_email(email: &str) -> Result<(), DomainError> {
        let trimmed = email.trim();

        if trimmed.is_empty() || !trimmed.contains('@') {
            return Err(DomainError::InvalidEmail(
                "Email address is not valid".to_string(),
            ));
        }

        Ok(())
    }
}
