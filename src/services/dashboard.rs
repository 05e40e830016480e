use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::models::{Booking, QuoteStatus};

const UPCOMING_LIMIT: i64 = 5;

#[derive(Debug, Serialize)]
pub struct AdminSummary {
    pub pending_quotes: i64,
    pub services: i64,
    pub customers: i64,
    pub upcoming: Vec<Booking>,
}

#[derive(Debug, Serialize)]
pub struct CustomerSummary {
    pub quotes: i64,
    pub bookings: i64,
    pub next_booking: Option<Booking>,
}

pub fn admin_summary(conn: &Connection, today: &NaiveDate) -> anyhow::Result<AdminSummary> {
    Ok(AdminSummary {
        pending_quotes: queries::count_quotes_with_status(conn, QuoteStatus::Pending)?,
        services: queries::count_services(conn)?,
        customers: queries::count_profiles(conn)?,
        upcoming: queries::get_upcoming_bookings(conn, today, UPCOMING_LIMIT)?,
    })
}

/// Quotes are matched by profile email since the public form is anonymous.
pub fn customer_summary(
    conn: &Connection,
    user_id: &str,
    today: &NaiveDate,
) -> anyhow::Result<CustomerSummary> {
    let quotes = match queries::get_profile(conn, user_id)? {
        Some(profile) => queries::count_quotes_for_email(conn, &profile.email)?,
        None => 0,
    };

    Ok(CustomerSummary {
        quotes,
        bookings: queries::count_bookings_for_user(conn, user_id)?,
        next_booking: queries::get_next_booking_for_user(conn, user_id, today)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{Profile, QuoteSubmission, ServiceDraft, UserRole};
    use crate::services::booking::{create_booking, BookingRequest, SlotGuard};
    use crate::services::{catalog, quote};

    fn book(conn: &Connection, service_id: &str, user: &str, date: &str, time: &str) -> Booking {
        let new = BookingRequest {
            scheduled_date: date.to_string(),
            scheduled_time: time.to_string(),
            service_id: Some(service_id.to_string()),
            user_id: Some(user.to_string()),
            notes: None,
        }
        .validate()
        .unwrap();
        create_booking(conn, &new, SlotGuard::Allow).unwrap()
    }

    #[test]
    fn test_admin_summary_counts_and_upcoming() {
        let conn = db::init_db(":memory:").unwrap();
        let svc = catalog::create_service(
            &conn,
            ServiceDraft {
                name: Some("Gutter Cleaning".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        book(&conn, &svc.id, "u1", "2025-01-09", "09:00:00");
        for hour in 9..16 {
            book(&conn, &svc.id, "u1", "2025-01-10", &format!("{hour:02}:00:00"));
        }
        quote::submit_quote(
            &conn,
            QuoteSubmission {
                first_name: Some("A".to_string()),
                last_name: Some("B".to_string()),
                email: Some("a@b.c".to_string()),
                service_needed: Some("Roof".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let summary = admin_summary(&conn, &today).unwrap();
        assert_eq!(summary.pending_quotes, 1);
        assert_eq!(summary.services, 1);
        assert_eq!(summary.customers, 0);
        assert_eq!(summary.upcoming.len(), 5);
        assert!(summary.upcoming.iter().all(|b| b.scheduled_date == today));
        assert!(summary
            .upcoming
            .windows(2)
            .all(|w| w[0].scheduled_time < w[1].scheduled_time));
    }

    #[test]
    fn test_customer_summary_is_scoped_to_user() {
        let conn = db::init_db(":memory:").unwrap();
        let svc = catalog::create_service(
            &conn,
            ServiceDraft {
                name: Some("Painting".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        queries::upsert_profile(
            &conn,
            &Profile {
                id: "u1".to_string(),
                email: "pat@example.com".to_string(),
                full_name: Some("Pat".to_string()),
                phone: None,
                address: None,
                role: UserRole::Customer,
            },
        )
        .unwrap();

        book(&conn, &svc.id, "u1", "2025-01-05", "09:00:00");
        let next = book(&conn, &svc.id, "u1", "2025-01-12", "11:00:00");
        book(&conn, &svc.id, "u1", "2025-01-20", "09:00:00");
        book(&conn, &svc.id, "u2", "2025-01-11", "09:00:00");

        let today = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let summary = customer_summary(&conn, "u1", &today).unwrap();
        assert_eq!(summary.bookings, 3);
        assert_eq!(summary.quotes, 0);
        assert_eq!(summary.next_booking.map(|b| b.id), Some(next.id));

        let nobody = customer_summary(&conn, "ghost", &today).unwrap();
        assert_eq!(nobody.bookings, 0);
        assert!(nobody.next_booking.is_none());
    }
}
