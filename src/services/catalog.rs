use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Service, ServiceDraft};

const DEFAULT_UNIT: &str = "hour";
const DEFAULT_HOURLY_RATE: i64 = 8000;
const DEFAULT_BASE_FEE: i64 = 2500;
const DEFAULT_MARKUP_PERCENT: f64 = 15.0;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Name is required")]
    NameRequired,

    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("service not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Store(#[from] anyhow::Error),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NameRequired | CatalogError::Negative(_) => {
                AppError::Validation(err.to_string())
            }
            CatalogError::NotFound(id) => AppError::NotFound(format!("service {id}")),
            CatalogError::Store(e) => AppError::Internal(e),
        }
    }
}

pub fn list_active(conn: &Connection) -> Result<Vec<Service>, CatalogError> {
    Ok(queries::list_services(conn, true)?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Service>, CatalogError> {
    Ok(queries::list_services(conn, false)?)
}

pub fn create_service(conn: &Connection, draft: ServiceDraft) -> Result<Service, CatalogError> {
    let name = draft
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or(CatalogError::NameRequired)?
        .to_string();
    check_amounts(&draft)?;

    let service = Service {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        description: draft.description,
        unit: Some(draft.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string())),
        is_active: draft.is_active.unwrap_or(true),
        min_price: draft.min_price,
        max_price: draft.max_price,
        hourly_rate: Some(draft.hourly_rate.unwrap_or(DEFAULT_HOURLY_RATE)),
        base_fee: Some(draft.base_fee.unwrap_or(DEFAULT_BASE_FEE)),
        materials_markup_percent: Some(
            draft
                .materials_markup_percent
                .unwrap_or(DEFAULT_MARKUP_PERCENT),
        ),
    };

    queries::insert_service(conn, &service)?;
    tracing::info!(service_id = %service.id, name = %service.name, "service created");
    Ok(service)
}

/// Applies the fields present in `draft` to an existing service.
pub fn update_service(
    conn: &Connection,
    id: &str,
    draft: ServiceDraft,
) -> Result<Service, CatalogError> {
    let mut service =
        queries::get_service(conn, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    check_amounts(&draft)?;

    if let Some(name) = draft.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::NameRequired);
        }
        service.name = name.to_string();
    }
    if let Some(description) = draft.description {
        service.description = Some(description);
    }
    if let Some(unit) = draft.unit {
        service.unit = Some(unit);
    }
    if let Some(active) = draft.is_active {
        service.is_active = active;
    }
    if draft.min_price.is_some() {
        service.min_price = draft.min_price;
    }
    if draft.max_price.is_some() {
        service.max_price = draft.max_price;
    }
    if draft.hourly_rate.is_some() {
        service.hourly_rate = draft.hourly_rate;
    }
    if draft.base_fee.is_some() {
        service.base_fee = draft.base_fee;
    }
    if draft.materials_markup_percent.is_some() {
        service.materials_markup_percent = draft.materials_markup_percent;
    }

    if !queries::update_service(conn, &service)? {
        return Err(CatalogError::NotFound(id.to_string()));
    }
    tracing::info!(service_id = %service.id, "service updated");
    Ok(service)
}

pub fn toggle_active(conn: &Connection, id: &str) -> Result<Service, CatalogError> {
    let mut service =
        queries::get_service(conn, id)?.ok_or_else(|| CatalogError::NotFound(id.to_string()))?;
    service.is_active = !service.is_active;

    if !queries::update_service(conn, &service)? {
        return Err(CatalogError::NotFound(id.to_string()));
    }
    tracing::info!(service_id = %service.id, active = service.is_active, "service toggled");
    Ok(service)
}

fn check_amounts(draft: &ServiceDraft) -> Result<(), CatalogError> {
    let cents = [
        ("min_price", draft.min_price),
        ("max_price", draft.max_price),
        ("hourly_rate", draft.hourly_rate),
        ("base_fee", draft.base_fee),
    ];
    for (field, value) in cents {
        if value.is_some_and(|v| v < 0) {
            return Err(CatalogError::Negative(field));
        }
    }
    if draft.materials_markup_percent.is_some_and(|v| v < 0.0) {
        return Err(CatalogError::Negative("materials_markup_percent"));
    }
    Ok(())
}
