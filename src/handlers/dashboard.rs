use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Profile, UserRole};
use crate::services::dashboard::{self, AdminSummary, CustomerSummary};
use crate::services::identity;
use crate::state::AppState;

// GET /api/admin/dashboard
pub async fn admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AdminSummary>, AppError> {
    let user_id = state.identity.current_user(&headers).await;
    let today = Utc::now().date_naive();

    let summary = {
        let db = state.conn()?;
        identity::require_admin(&db, user_id.as_deref())?;
        dashboard::admin_summary(&db, &today)?
    };
    Ok(Json(summary))
}

// GET /api/me/dashboard
pub async fn customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CustomerSummary>, AppError> {
    let user_id = state
        .identity
        .current_user(&headers)
        .await
        .ok_or(AppError::Unauthorized)?;
    let today = Utc::now().date_naive();

    let summary = {
        let db = state.conn()?;
        dashboard::customer_summary(&db, &user_id, &today)?
    };
    Ok(Json(summary))
}

// POST /api/me/profile
#[derive(Deserialize)]
pub struct ProfileBody {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<ProfileBody>,
) -> Result<Json<Profile>, AppError> {
    let user_id = state
        .identity
        .current_user(&headers)
        .await
        .ok_or(AppError::Unauthorized)?;

    let email = body
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| e.contains('@'))
        .ok_or_else(|| AppError::Validation("a valid email is required".to_string()))?;

    let profile = {
        let db = state.conn()?;
        queries::upsert_profile(
            &db,
            &Profile {
                id: user_id.clone(),
                email,
                full_name: body.full_name,
                phone: body.phone,
                address: body.address,
                role: UserRole::Customer,
            },
        )?;
        queries::get_profile(&db, &user_id)?
            .ok_or_else(|| AppError::NotFound(format!("profile {user_id}")))?
    };
    Ok(Json(profile))
}
