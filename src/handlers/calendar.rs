use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::booking::parse_date;
use crate::models::Booking;
use crate::services::booking::{self, BookingRequest};
use crate::services::occupancy::{DayView, OccupancyMap};
use crate::services::slots::SlotLabel;
use crate::state::AppState;

fn load_day(state: &AppState, date: chrono::NaiveDate) -> Result<DayView, AppError> {
    let bookings = {
        let db = state.conn()?;
        queries::get_bookings_for_date(&db, &date)?
    };
    Ok(OccupancyMap::build(&bookings).day_view(date, &state.grid))
}

// GET /api/slots
pub async fn get_slots(State(state): State<Arc<AppState>>) -> Json<Vec<SlotLabel>> {
    Json(state.grid.labels())
}

// GET /api/calendar/:date
pub async fn get_day(
    State(state): State<Arc<AppState>>,
    Path(raw_date): Path<String>,
) -> Result<Json<DayView>, AppError> {
    let date = parse_date(&raw_date)
        .ok_or_else(|| AppError::Validation(format!("invalid date: {raw_date}")))?;
    Ok(Json(load_day(&state, date)?))
}

/// `day` is the booking's current date. A reschedule across dates also
/// carries the date it left as `previous_day`.
#[derive(Serialize)]
pub struct BookingWriteResponse {
    booking: Booking,
    day: DayView,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_day: Option<DayView>,
}

// POST /api/bookings
#[derive(Deserialize)]
pub struct CreateBookingBody {
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub service_id: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateBookingBody>,
) -> Result<Json<BookingWriteResponse>, AppError> {
    let user_id = state.identity.current_user(&headers).await;

    let new = BookingRequest {
        scheduled_date: body.scheduled_date,
        scheduled_time: body.scheduled_time,
        service_id: body.service_id,
        user_id,
        notes: body.notes,
    }
    .validate()
    .inspect_err(|e| tracing::warn!(error = %e, "booking request rejected"))?;

    let created = {
        let db = state.conn()?;
        booking::create_booking(&db, &new, state.config.slot_guard)?
    };

    let day = load_day(&state, created.scheduled_date)?;
    Ok(Json(BookingWriteResponse {
        booking: created,
        day,
        previous_day: None,
    }))
}

// POST /api/bookings/:id/reschedule
#[derive(Deserialize)]
pub struct RescheduleBody {
    pub scheduled_date: String,
    pub scheduled_time: String,
}

pub async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<RescheduleBody>,
) -> Result<Json<BookingWriteResponse>, AppError> {
    let (date, time) = booking::parse_schedule(&body.scheduled_date, &body.scheduled_time)?;

    let (moved, from_date) = {
        let db = state.conn()?;
        let from_date = queries::get_booking_by_id(&db, &id)?.map(|b| b.scheduled_date);
        let moved = booking::reschedule_booking(&db, &id, date, time, state.config.slot_guard)?;
        (moved, from_date)
    };

    let day = load_day(&state, moved.scheduled_date)?;
    let previous_day = match from_date {
        Some(from) if from != moved.scheduled_date => Some(load_day(&state, from)?),
        _ => None,
    };

    Ok(Json(BookingWriteResponse {
        booking: moved,
        day,
        previous_day,
    }))
}
