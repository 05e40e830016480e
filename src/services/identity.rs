use async_trait::async_trait;
use axum::http::HeaderMap;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Profile, UserRole};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolves the signed-in user for a request. Session verification happens
/// upstream; this only reads its result.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self, headers: &HeaderMap) -> Option<String>;
}

/// Trusts the user id the auth proxy puts in `x-user-id`.
pub struct HeaderIdentity;

#[async_trait]
impl IdentityProvider for HeaderIdentity {
    async fn current_user(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

pub fn require_admin(conn: &Connection, user_id: Option<&str>) -> Result<Profile, AppError> {
    let user_id = user_id.ok_or(AppError::Unauthorized)?;
    match queries::get_profile(conn, user_id)? {
        Some(profile) if profile.role == UserRole::Admin => Ok(profile),
        _ => {
            tracing::warn!(user_id, "non-admin access to admin endpoint");
            Err(AppError::Forbidden)
        }
    }
}
