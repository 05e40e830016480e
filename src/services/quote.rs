use rusqlite::Connection;

use crate::db::queries;
use crate::models::{QuoteRequest, QuoteStatus, QuoteSubmission};

pub const SUCCESS_MESSAGE: &str =
    "Quote request submitted successfully. We will contact you within 24 hours.";

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Failed to submit quote request")]
    Store(#[source] anyhow::Error),
}

/// Validates a public quote form submission and stores it as `pending`.
/// Every call inserts a new row.
pub fn submit_quote(conn: &Connection, form: QuoteSubmission) -> Result<QuoteRequest, QuoteError> {
    let (first_name, last_name, email, service_needed) = match (
        present(form.first_name),
        present(form.last_name),
        present(form.email),
        present(form.service_needed),
    ) {
        (Some(first), Some(last), Some(email), Some(service)) => (first, last, email, service),
        _ => return Err(QuoteError::MissingFields),
    };

    let quote = QuoteRequest {
        id: uuid::Uuid::new_v4().to_string(),
        first_name,
        last_name,
        email,
        phone: present(form.phone),
        service_needed,
        description: present(form.description),
        preferred_timeline: present(form.preferred_timeline),
        status: QuoteStatus::Pending,
        created_at: queries::now_timestamp(),
    };

    queries::insert_quote_request(conn, &quote).map_err(QuoteError::Store)?;

    tracing::info!(quote_id = %quote.id, service = %quote.service_needed, "quote request submitted");
    Ok(quote)
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn form() -> QuoteSubmission {
        QuoteSubmission {
            first_name: Some("Dana".to_string()),
            last_name: Some("Reyes".to_string()),
            email: Some("dana@example.com".to_string()),
            phone: Some("201-555-0100".to_string()),
            service_needed: Some("Deck repair".to_string()),
            description: Some("Two loose boards".to_string()),
            preferred_timeline: None,
        }
    }

    #[test]
    fn test_submit_stores_pending_row() {
        let conn = db::init_db(":memory:").unwrap();
        let quote = submit_quote(&conn, form()).unwrap();
        assert_eq!(quote.status, QuoteStatus::Pending);

        let stored = queries::get_quote_request(&conn, &quote.id).unwrap().unwrap();
        assert_eq!(stored.email, "dana@example.com");
        assert_eq!(stored.phone.as_deref(), Some("201-555-0100"));
        assert!(stored.preferred_timeline.is_none());
        assert_eq!(
            queries::count_quotes_with_status(&conn, QuoteStatus::Pending).unwrap(),
            1
        );
    }

    #[test]
    fn test_missing_required_field() {
        let conn = db::init_db(":memory:").unwrap();
        let mut missing_email = form();
        missing_email.email = None;
        assert!(matches!(
            submit_quote(&conn, missing_email),
            Err(QuoteError::MissingFields)
        ));

        let mut blank_service = form();
        blank_service.service_needed = Some("  ".to_string());
        assert!(matches!(
            submit_quote(&conn, blank_service),
            Err(QuoteError::MissingFields)
        ));

        assert_eq!(
            queries::count_quotes_with_status(&conn, QuoteStatus::Pending).unwrap(),
            0
        );
    }

    #[test]
    fn test_repeat_submission_creates_new_rows() {
        let conn = db::init_db(":memory:").unwrap();
        let a = submit_quote(&conn, form()).unwrap();
        let b = submit_quote(&conn, form()).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(queries::count_quotes_for_email(&conn, "DANA@example.com").unwrap(), 2);
    }
}
