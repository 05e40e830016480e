use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::booking::{DATE_FORMAT, TIME_FORMAT};
use crate::models::{
    Booking, BookingStatus, Profile, QuoteRequest, QuoteStatus, Service, UserRole,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str =
    "id, scheduled_date, scheduled_time, status, service_id, user_id, notes, created_at, updated_at";

const NEXT_REVISION: &str = "(SELECT COALESCE(MAX(revision), 0) + 1 FROM bookings)";

const SERVICE_COLUMNS: &str = "id, name, description, unit, is_active, min_price, max_price, hourly_rate, base_fee, materials_markup_percent";

/// Current UTC time at the second precision the store keeps.
pub fn now_timestamp() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS}, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, {NEXT_REVISION})"
        ),
        params![
            booking.id,
            booking.scheduled_date.format(DATE_FORMAT).to_string(),
            booking.scheduled_time.format(TIME_FORMAT).to_string(),
            booking.status.as_str(),
            booking.service_id,
            booking.user_id,
            booking.notes,
            booking.created_at.format(TIMESTAMP_FORMAT).to_string(),
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// All bookings on `date`, ordered by time and then by write order, so the
/// most recently written booking in a slot comes last.
pub fn get_bookings_for_date(conn: &Connection, date: &NaiveDate) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE scheduled_date = ?1 ORDER BY scheduled_time ASC, revision ASC, rowid ASC"
    ))?;

    let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;

    result.transpose()
}

/// Moves a booking to a new date and time. Returns false when no row matched.
pub fn update_booking_schedule(
    conn: &Connection,
    id: &str,
    date: &NaiveDate,
    time: &NaiveTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        &format!(
            "UPDATE bookings SET scheduled_date = ?1, scheduled_time = ?2, updated_at = ?3,
               revision = {NEXT_REVISION}
             WHERE id = ?4"
        ),
        params![
            date.format(DATE_FORMAT).to_string(),
            time.format(TIME_FORMAT).to_string(),
            now_timestamp().format(TIMESTAMP_FORMAT).to_string(),
            id,
        ],
    )?;
    Ok(count > 0)
}

/// Whether a non-cancelled booking other than `exclude_id` holds the slot.
pub fn slot_taken(
    conn: &Connection,
    date: &NaiveDate,
    time: &NaiveTime,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM bookings
         WHERE scheduled_date = ?1 AND scheduled_time = ?2 AND status != 'cancelled'
           AND (?3 IS NULL OR id != ?3)",
        params![
            date.format(DATE_FORMAT).to_string(),
            time.format(TIME_FORMAT).to_string(),
            exclude_id,
        ],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_upcoming_bookings(
    conn: &Connection,
    from: &NaiveDate,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE scheduled_date >= ?1
         ORDER BY scheduled_date ASC, scheduled_time ASC LIMIT ?2"
    ))?;

    let rows = stmt.query_map(params![from.format(DATE_FORMAT).to_string(), limit], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_next_booking_for_user(
    conn: &Connection,
    user_id: &str,
    from: &NaiveDate,
) -> anyhow::Result<Option<Booking>> {
    let result = conn
        .query_row(
            &format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = ?1 AND scheduled_date >= ?2
                 ORDER BY scheduled_date ASC, scheduled_time ASC LIMIT 1"
            ),
            params![user_id, from.format(DATE_FORMAT).to_string()],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;

    result.transpose()
}

pub fn count_bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let date_str: String = row.get(1)?;
    let time_str: String = row.get(2)?;
    let status_str: String = row.get(3)?;
    let service_id: Option<String> = row.get(4)?;
    let user_id: Option<String> = row.get(5)?;
    let notes: Option<String> = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let updated_at_str: String = row.get(8)?;

    let scheduled_date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .with_context(|| format!("booking {id} has malformed scheduled_date: {date_str}"))?;
    let scheduled_time = NaiveTime::parse_from_str(&time_str, TIME_FORMAT)
        .with_context(|| format!("booking {id} has malformed scheduled_time: {time_str}"))?;

    Ok(Booking {
        id,
        scheduled_date,
        scheduled_time,
        status: BookingStatus::parse(&status_str),
        service_id,
        user_id,
        notes,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("malformed timestamp: {s}"))
}

// ── Services ──

pub fn insert_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO services ({SERVICE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        params![
            service.id,
            service.name,
            service.description,
            service.unit,
            service.is_active as i32,
            service.min_price,
            service.max_price,
            service.hourly_rate,
            service.base_fee,
            service.materials_markup_percent,
        ],
    )?;
    Ok(())
}

pub fn update_service(conn: &Connection, service: &Service) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE services SET name = ?2, description = ?3, unit = ?4, is_active = ?5,
           min_price = ?6, max_price = ?7, hourly_rate = ?8, base_fee = ?9,
           materials_markup_percent = ?10, updated_at = datetime('now')
         WHERE id = ?1",
        params![
            service.id,
            service.name,
            service.description,
            service.unit,
            service.is_active as i32,
            service.min_price,
            service.max_price,
            service.hourly_rate,
            service.base_fee,
            service.materials_markup_percent,
        ],
    )?;
    Ok(count > 0)
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    let service = conn
        .query_row(
            &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1"),
            params![id],
            service_from_row,
        )
        .optional()?;
    Ok(service)
}

pub fn list_services(conn: &Connection, active_only: bool) -> anyhow::Result<Vec<Service>> {
    let sql = if active_only {
        format!("SELECT {SERVICE_COLUMNS} FROM services WHERE is_active = 1 ORDER BY name ASC")
    } else {
        format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY name ASC")
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], service_from_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn count_services(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?;
    Ok(count)
}

fn service_from_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        unit: row.get(3)?,
        is_active: row.get::<_, i32>(4)? != 0,
        min_price: row.get(5)?,
        max_price: row.get(6)?,
        hourly_rate: row.get(7)?,
        base_fee: row.get(8)?,
        materials_markup_percent: row.get(9)?,
    })
}

// ── Quote Requests ──

pub fn insert_quote_request(conn: &Connection, quote: &QuoteRequest) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO quote_requests (id, first_name, last_name, email, phone, service_needed, description, preferred_timeline, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            quote.id,
            quote.first_name,
            quote.last_name,
            quote.email,
            quote.phone,
            quote.service_needed,
            quote.description,
            quote.preferred_timeline,
            quote.status.as_str(),
            quote.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_quote_request(conn: &Connection, id: &str) -> anyhow::Result<Option<QuoteRequest>> {
    let result = conn
        .query_row(
            "SELECT id, first_name, last_name, email, phone, service_needed, description, preferred_timeline, status, created_at
             FROM quote_requests WHERE id = ?1",
            params![id],
            |row| Ok(parse_quote_row(row)),
        )
        .optional()?;

    result.transpose()
}

fn parse_quote_row(row: &rusqlite::Row) -> anyhow::Result<QuoteRequest> {
    let status: String = row.get(8)?;
    let created_at: String = row.get(9)?;

    Ok(QuoteRequest {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        service_needed: row.get(5)?,
        description: row.get(6)?,
        preferred_timeline: row.get(7)?,
        status: QuoteStatus::parse(&status),
        created_at: parse_timestamp(&created_at)?,
    })
}

pub fn count_quotes_with_status(conn: &Connection, status: QuoteStatus) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM quote_requests WHERE status = ?1",
        params![status.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_quotes_for_email(conn: &Connection, email: &str) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM quote_requests WHERE lower(email) = lower(?1)",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ── Profiles ──

pub fn get_profile(conn: &Connection, id: &str) -> anyhow::Result<Option<Profile>> {
    let profile = conn
        .query_row(
            "SELECT id, email, full_name, phone, address, role FROM profiles WHERE id = ?1",
            params![id],
            |row| {
                let role: String = row.get(5)?;
                Ok(Profile {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    full_name: row.get(2)?,
                    phone: row.get(3)?,
                    address: row.get(4)?,
                    role: UserRole::parse(&role),
                })
            },
        )
        .optional()?;
    Ok(profile)
}

/// Inserts or updates contact fields. An existing role is never changed here.
pub fn upsert_profile(conn: &Connection, profile: &Profile) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO profiles (id, email, full_name, phone, address, role)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
           email = excluded.email,
           full_name = excluded.full_name,
           phone = excluded.phone,
           address = excluded.address,
           updated_at = datetime('now')",
        params![
            profile.id,
            profile.email,
            profile.full_name,
            profile.phone,
            profile.address,
            profile.role.as_str(),
        ],
    )?;
    Ok(())
}

pub fn set_profile_role(conn: &Connection, id: &str, role: UserRole) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE profiles SET role = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![role.as_str(), id],
    )?;
    Ok(count > 0)
}

pub fn count_profiles(conn: &Connection) -> anyhow::Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
    Ok(count)
}
