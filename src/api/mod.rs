/// API payload layer
///
/// These functions produce the `data` payloads behind the web endpoints:
/// habit CRUD, completion recording, stats, analytics, calendar and admin
/// aggregates. Routing, sessions and rendering live in the web
/// collaborator; everything here is generic over the storage traits so it
/// can be exercised against any backend.

pub mod habits;
pub mod complete;
pub mod stats;
pub mod analytics;
pub mod admin;

// Re-export handler functions and payload types for easy access
pub use habits::*;
pub use complete::*;
pub use stats::*;
pub use analytics::*;
pub use admin::*;

use serde::Serialize;
use crate::ServiceError;

/// Uniform response envelope shared by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Wrap a handler result in the envelope the front end expects
pub fn into_envelope<T>(result: Result<T, ServiceError>) -> ApiResponse<T> {
    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(err) => ApiResponse::failure(err.to_string()),
    }
}
