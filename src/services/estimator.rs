use serde::Serialize;

use crate::errors::AppError;
use crate::models::Service;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EstimateError {
    #[error("{0} cannot be negative")]
    Negative(&'static str),

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("estimate exceeds {}", format_cents(MAX_TOTAL_CENTS))]
    TooLarge,
}

/// Largest total the estimator will quote, in cents.
pub const MAX_TOTAL_CENTS: i64 = 100_000_000_000;

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Estimate {
    pub service_id: String,
    pub hours: f64,
    pub materials: f64,
    pub total_cents: i64,
    pub display: String,
}

/// Base fee, plus labor at the hourly rate, plus materials marked up by the
/// service's percentage. Missing pricing fields count as zero.
///
/// Materials are rounded to whole cents on their own. Labor is kept
/// fractional and the sum is rounded once, so fractional hours never lose
/// more than half a cent.
pub fn estimate(service: &Service, hours: f64, materials_usd: f64) -> Result<Estimate, EstimateError> {
    check("hours", hours)?;
    check("materials", materials_usd)?;

    let base = service.base_fee.unwrap_or(0) as f64;
    let hourly = service.hourly_rate.unwrap_or(0) as f64;
    let markup = service.materials_markup_percent.unwrap_or(0.0) / 100.0;

    let labor = hourly * hours;
    let materials = (materials_usd * 100.0 * (1.0 + markup)).round();
    let total = (base + labor + materials).round();
    if !total.is_finite() || total > MAX_TOTAL_CENTS as f64 {
        return Err(EstimateError::TooLarge);
    }
    let total_cents = total as i64;

    Ok(Estimate {
        service_id: service.id.clone(),
        hours,
        materials: materials_usd,
        total_cents,
        display: format_cents(total_cents),
    })
}

pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

fn check(field: &'static str, value: f64) -> Result<(), EstimateError> {
    if !value.is_finite() {
        return Err(EstimateError::NotFinite(field));
    }
    if value < 0.0 {
        return Err(EstimateError::Negative(field));
    }
    Ok(())
}
