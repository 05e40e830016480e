use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Service, ServiceDraft};
use crate::services::estimator::{self, Estimate};
use crate::services::{catalog, identity};
use crate::state::AppState;

async fn admin_only(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let user_id = state.identity.current_user(headers).await;
    let db = state.conn()?;
    identity::require_admin(&db, user_id.as_deref())?;
    Ok(())
}

// GET /api/services
pub async fn list_active(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Service>>, AppError> {
    let services = {
        let db = state.conn()?;
        catalog::list_active(&db)?
    };
    Ok(Json(services))
}

// GET /api/admin/services
pub async fn list_all(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Service>>, AppError> {
    admin_only(&state, &headers).await?;
    let services = {
        let db = state.conn()?;
        catalog::list_all(&db)?
    };
    Ok(Json(services))
}

// POST /api/admin/services
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(draft): Json<ServiceDraft>,
) -> Result<Json<Service>, AppError> {
    admin_only(&state, &headers).await?;
    let service = {
        let db = state.conn()?;
        catalog::create_service(&db, draft)?
    };
    Ok(Json(service))
}

// PUT /api/admin/services/:id
pub async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(draft): Json<ServiceDraft>,
) -> Result<Json<Service>, AppError> {
    admin_only(&state, &headers).await?;
    let service = {
        let db = state.conn()?;
        catalog::update_service(&db, &id, draft)?
    };
    Ok(Json(service))
}

// POST /api/admin/services/:id/toggle
pub async fn toggle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Service>, AppError> {
    admin_only(&state, &headers).await?;
    let service = {
        let db = state.conn()?;
        catalog::toggle_active(&db, &id)?
    };
    Ok(Json(service))
}

// GET /api/estimate
#[derive(Deserialize)]
pub struct EstimateQuery {
    pub service_id: String,
    pub hours: Option<f64>,
    pub materials: Option<f64>,
}

pub async fn estimate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<Estimate>, AppError> {
    let service = {
        let db = state.conn()?;
        queries::get_service(&db, &query.service_id)?
    }
    .filter(|s| s.is_active)
    .ok_or_else(|| AppError::NotFound(format!("service {}", query.service_id)))?;

    let est = estimator::estimate(
        &service,
        query.hours.unwrap_or(2.0),
        query.materials.unwrap_or(50.0),
    )?;
    Ok(Json(est))
}
