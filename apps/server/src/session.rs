//! # Session Extraction
//!
//! Who is calling, taken from request headers.
//!
//! ```text
//!   x-tenant-id: <uuid>   ──►  Session.tenant_id   (scopes every query)
//!   x-user-id:   <uuid>   ──►  Session.user_id     (seller of the current order,
//!                                                   creator/executor/reverter
//!                                                   of bulk modifications)
//! ```
//!
//! Authentication happens upstream; this only parses what it forwards.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller's tenant and user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub tenant_id: String,
    pub user_id: String,
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = uuid_header(parts, TENANT_ID_HEADER)?;
        let user_id = uuid_header(parts, USER_ID_HEADER)?;

        Ok(Session { tenant_id, user_id })
    }
}

/// Reads a header that must hold a UUID; returns it hyphenated and lowercase.
fn uuid_header(parts: &Parts, name: &str) -> Result<String, ApiError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::unauthorized(format!("Header {} is required", name)))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized(format!("Header {} contains invalid characters", name)))?;

    let id = Uuid::parse_str(value.trim())
        .map_err(|_| ApiError::unauthorized(format!("Header {} is not a valid UUID", name)))?;

    Ok(id.to_string())
}
