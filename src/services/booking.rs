use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::booking::{parse_date, parse_time_of_day};
use crate::models::{Booking, BookingStatus};

/// Whether writes may land in a slot another booking already holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotGuard {
    #[default]
    Allow,
    RejectOccupied,
}

impl SlotGuard {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "reject" | "reject_occupied" => SlotGuard::RejectOccupied,
            _ => SlotGuard::Allow,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("booking not found: {0}")]
    NotFound(String),

    #[error("slot {date} {time} is already booked")]
    SlotTaken { date: NaiveDate, time: NaiveTime },

    #[error("{0}")]
    Store(#[from] anyhow::Error),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::MissingField(_) | BookingError::InvalidField { .. } => {
                AppError::Validation(err.to_string())
            }
            BookingError::NotFound(id) => AppError::NotFound(format!("booking {id}")),
            BookingError::SlotTaken { .. } => AppError::Conflict(err.to_string()),
            BookingError::Store(e) => AppError::Internal(e),
        }
    }
}

/// A booking request as it arrives from the caller, before validation.
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub service_id: Option<String>,
    pub user_id: Option<String>,
    pub notes: Option<String>,
}

/// A validated booking request, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub service_id: String,
    pub user_id: String,
    pub notes: Option<String>,
}

impl BookingRequest {
    /// Service and user must be present. Date and time must parse but need not
    /// sit on the slot grid.
    pub fn validate(self) -> Result<NewBooking, BookingError> {
        let service_id = required(self.service_id, "service")?;
        let user_id = required(self.user_id, "user")?;
        let (scheduled_date, scheduled_time) =
            parse_schedule(&self.scheduled_date, &self.scheduled_time)?;

        Ok(NewBooking {
            scheduled_date,
            scheduled_time,
            service_id,
            user_id,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, BookingError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(BookingError::MissingField(field))
}

pub fn parse_schedule(date: &str, time: &str) -> Result<(NaiveDate, NaiveTime), BookingError> {
    let date_value = parse_date(date).ok_or_else(|| BookingError::InvalidField {
        field: "scheduled_date",
        value: date.to_string(),
    })?;
    let time_value = parse_time_of_day(time).ok_or_else(|| BookingError::InvalidField {
        field: "scheduled_time",
        value: time.to_string(),
    })?;
    Ok((date_value, time_value))
}

/// Inserts a new `pending` booking.
pub fn create_booking(
    conn: &Connection,
    new: &NewBooking,
    guard: SlotGuard,
) -> Result<Booking, BookingError> {
    if guard == SlotGuard::RejectOccupied
        && queries::slot_taken(conn, &new.scheduled_date, &new.scheduled_time, None)?
    {
        return Err(BookingError::SlotTaken {
            date: new.scheduled_date,
            time: new.scheduled_time,
        });
    }

    let now = queries::now_timestamp();
    let booking = Booking {
        id: uuid::Uuid::new_v4().to_string(),
        scheduled_date: new.scheduled_date,
        scheduled_time: new.scheduled_time,
        status: BookingStatus::Pending,
        service_id: Some(new.service_id.clone()),
        user_id: Some(new.user_id.clone()),
        notes: new.notes.clone(),
        created_at: now,
        updated_at: now,
    };

    queries::insert_booking(conn, &booking)?;

    tracing::info!(
        booking_id = %booking.id,
        date = %booking.scheduled_date,
        time = %booking.scheduled_time,
        "booking requested"
    );

    Ok(booking)
}

/// Moves a booking to a new date and time. Status, service and user are left
/// untouched.
pub fn reschedule_booking(
    conn: &Connection,
    id: &str,
    date: NaiveDate,
    time: NaiveTime,
    guard: SlotGuard,
) -> Result<Booking, BookingError> {
    if guard == SlotGuard::RejectOccupied && queries::slot_taken(conn, &date, &time, Some(id))? {
        return Err(BookingError::SlotTaken { date, time });
    }

    if !queries::update_booking_schedule(conn, id, &date, &time)? {
        return Err(BookingError::NotFound(id.to_string()));
    }

    let booking =
        queries::get_booking_by_id(conn, id)?.ok_or_else(|| BookingError::NotFound(id.to_string()))?;

    tracing::info!(booking_id = %id, date = %date, time = %time, "booking rescheduled");

    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::Service;
    use crate::services::occupancy::OccupancyMap;

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        queries::insert_service(
            &conn,
            &Service {
                id: "svc-drywall".to_string(),
                name: "Drywall Repair".to_string(),
                description: None,
                unit: Some("hour".to_string()),
                is_active: true,
                min_price: None,
                max_price: None,
                hourly_rate: Some(8000),
                base_fee: Some(2500),
                materials_markup_percent: Some(15.0),
            },
        )
        .unwrap();
        conn
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        parse_time_of_day(s).unwrap()
    }

    fn request(at: &str, user: Option<&str>, service: Option<&str>) -> BookingRequest {
        BookingRequest {
            scheduled_date: "2025-01-10".to_string(),
            scheduled_time: at.to_string(),
            service_id: service.map(str::to_string),
            user_id: user.map(str::to_string),
            notes: None,
        }
    }

    #[test]
    fn test_missing_service_rejected_before_write() {
        let conn = setup_db();
        let err = request("09:00:00", Some("user-1"), None).validate().unwrap_err();
        assert!(matches!(err, BookingError::MissingField("service")));
        assert!(queries::get_bookings_for_date(&conn, &date("2025-01-10"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_user_rejected_before_write() {
        let conn = setup_db();
        let err = request("09:00:00", None, Some("svc-drywall"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, BookingError::MissingField("user")));

        let blank = request("09:00:00", Some("   "), Some("svc-drywall")).validate();
        assert!(matches!(blank, Err(BookingError::MissingField("user"))));
        assert!(queries::get_bookings_for_date(&conn, &date("2025-01-10"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unparseable_time_rejected() {
        let err = request("nine", Some("user-1"), Some("svc-drywall"))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidField {
                field: "scheduled_time",
                ..
            }
        ));
    }

    #[test]
    fn test_create_sets_pending_status() {
        let conn = setup_db();
        let new = request("09:00:00", Some("user-1"), Some("svc-drywall"))
            .validate()
            .unwrap();
        let booking = create_booking(&conn, &new, SlotGuard::Allow).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);

        let stored = queries::get_booking_by_id(&conn, &booking.id).unwrap().unwrap();
        assert_eq!(stored, booking);
    }

    #[test]
    fn test_create_off_grid_time_is_accepted() {
        let conn = setup_db();
        let new = request("09:30", Some("user-1"), Some("svc-drywall"))
            .validate()
            .unwrap();
        let booking = create_booking(&conn, &new, SlotGuard::Allow).unwrap();
        assert_eq!(booking.scheduled_time, time("09:30:00"));
    }

    #[test]
    fn test_create_with_unknown_service_is_store_error() {
        let conn = setup_db();
        let new = request("09:00:00", Some("user-1"), Some("svc-missing"))
            .validate()
            .unwrap();
        let err = create_booking(&conn, &new, SlotGuard::Allow).unwrap_err();
        assert!(matches!(err, BookingError::Store(_)));
        assert!(queries::get_bookings_for_date(&conn, &date("2025-01-10"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_reschedule_moves_booking_between_slots() {
        let conn = setup_db();
        let new = request("09:00:00", Some("user-1"), Some("svc-drywall"))
            .validate()
            .unwrap();
        let booking = create_booking(&conn, &new, SlotGuard::Allow).unwrap();

        let moved = reschedule_booking(
            &conn,
            &booking.id,
            date("2025-01-10"),
            time("10:00:00"),
            SlotGuard::Allow,
        )
        .unwrap();
        assert_eq!(moved.status, BookingStatus::Pending);
        assert_eq!(moved.service_id.as_deref(), Some("svc-drywall"));
        assert_eq!(moved.user_id.as_deref(), Some("user-1"));

        let day = queries::get_bookings_for_date(&conn, &date("2025-01-10")).unwrap();
        let map = OccupancyMap::build(&day);
        assert!(map.get(&time("09:00:00")).is_none());
        assert_eq!(
            map.get(&time("10:00:00")).map(|b| b.id.as_str()),
            Some(booking.id.as_str())
        );
    }

    #[test]
    fn test_reschedule_to_another_date() {
        let conn = setup_db();
        let new = request("09:00:00", Some("user-1"), Some("svc-drywall"))
            .validate()
            .unwrap();
        let booking = create_booking(&conn, &new, SlotGuard::Allow).unwrap();

        reschedule_booking(
            &conn,
            &booking.id,
            date("2025-01-11"),
            time("14:00:00"),
            SlotGuard::Allow,
        )
        .unwrap();

        assert!(queries::get_bookings_for_date(&conn, &date("2025-01-10"))
            .unwrap()
            .is_empty());
        let next_day = queries::get_bookings_for_date(&conn, &date("2025-01-11")).unwrap();
        assert_eq!(next_day.len(), 1);
        assert_eq!(next_day[0].scheduled_time, time("14:00:00"));
    }

    #[test]
    fn test_reschedule_unknown_booking() {
        let conn = setup_db();
        let err = reschedule_booking(
            &conn,
            "no-such-booking",
            date("2025-01-10"),
            time("10:00:00"),
            SlotGuard::Allow,
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[test]
    fn test_double_booking_allowed_and_collapsed_in_view() {
        let conn = setup_db();
        let first = request("09:00:00", Some("user-1"), Some("svc-drywall"))
            .validate()
            .unwrap();
        let second = request("09:00:00", Some("user-2"), Some("svc-drywall"))
            .validate()
            .unwrap();

        let a = create_booking(&conn, &first, SlotGuard::Allow).unwrap();
        let b = create_booking(&conn, &second, SlotGuard::Allow).unwrap();
        assert_ne!(a.id, b.id);

        let day = queries::get_bookings_for_date(&conn, &date("2025-01-10")).unwrap();
        assert_eq!(day.len(), 2);
        assert!(day.iter().all(|bk| bk.scheduled_time == time("09:00:00")));

        let map = OccupancyMap::build(&day);
        assert_eq!(map.get(&time("09:00:00")).map(|bk| bk.id.as_str()), Some(b.id.as_str()));
        let shadowed = map.shadowed();
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].hidden, vec![a.id]);
    }

    #[test]
    fn test_rescheduled_booking_wins_occupied_slot() {
        let conn = setup_db();
        let x = create_booking(
            &conn,
            &request("09:00:00", Some("user-1"), Some("svc-drywall"))
                .validate()
                .unwrap(),
            SlotGuard::Allow,
        )
        .unwrap();
        let y = create_booking(
            &conn,
            &request("10:00:00", Some("user-2"), Some("svc-drywall"))
                .validate()
                .unwrap(),
            SlotGuard::Allow,
        )
        .unwrap();

        reschedule_booking(
            &conn,
            &x.id,
            date("2025-01-10"),
            time("10:00:00"),
            SlotGuard::Allow,
        )
        .unwrap();

        let day = queries::get_bookings_for_date(&conn, &date("2025-01-10")).unwrap();
        let map = OccupancyMap::build(&day);
        assert_eq!(map.get(&time("10:00:00")).map(|bk| bk.id.as_str()), Some(x.id.as_str()));
        assert!(map.get(&time("09:00:00")).is_none());
        assert_eq!(map.shadowed()[0].hidden, vec![y.id]);
    }

    #[test]
    fn test_guard_rejects_occupied_slot() {
        let conn = setup_db();
        let first = request("09:00:00", Some("user-1"), Some("svc-drywall"))
            .validate()
            .unwrap();
        let second = request("09:00:00", Some("user-2"), Some("svc-drywall"))
            .validate()
            .unwrap();

        create_booking(&conn, &first, SlotGuard::RejectOccupied).unwrap();
        let err = create_booking(&conn, &second, SlotGuard::RejectOccupied).unwrap_err();
        assert!(matches!(err, BookingError::SlotTaken { .. }));

        let day = queries::get_bookings_for_date(&conn, &date("2025-01-10")).unwrap();
        assert_eq!(day.len(), 1);
    }

    #[test]
    fn test_guard_rejects_reschedule_into_taken_slot() {
        let conn = setup_db();
        let first = request("09:00:00", Some("user-1"), Some("svc-drywall"))
            .validate()
            .unwrap();
        let second = request("10:00:00", Some("user-2"), Some("svc-drywall"))
            .validate()
            .unwrap();
        create_booking(&conn, &first, SlotGuard::RejectOccupied).unwrap();
        let b = create_booking(&conn, &second, SlotGuard::RejectOccupied).unwrap();

        let err = reschedule_booking(
            &conn,
            &b.id,
            date("2025-01-10"),
            time("09:00:00"),
            SlotGuard::RejectOccupied,
        )
        .unwrap_err();
        assert!(matches!(err, BookingError::SlotTaken { .. }));

        // Re-saving into its own slot is not a conflict.
        reschedule_booking(
            &conn,
            &b.id,
            date("2025-01-10"),
            time("10:00:00"),
            SlotGuard::RejectOccupied,
        )
        .unwrap();
    }

    #[test]
    fn test_slot_guard_parse() {
        assert_eq!(SlotGuard::parse("reject"), SlotGuard::RejectOccupied);
        assert_eq!(SlotGuard::parse("REJECT_OCCUPIED"), SlotGuard::RejectOccupied);
        assert_eq!(SlotGuard::parse("allow"), SlotGuard::Allow);
        assert_eq!(SlotGuard::parse("whatever"), SlotGuard::Allow);
    }
}
