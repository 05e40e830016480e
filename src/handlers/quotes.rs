use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tower_http::cors::{Any, CorsLayer};

use crate::models::QuoteSubmission;
use crate::services::quote::{self, QuoteError, SUCCESS_MESSAGE};
use crate::state::AppState;

/// The quote form is posted cross-origin from the marketing site.
pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

// POST /functions/submit-quote-request
pub async fn submit_quote_request(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let form: QuoteSubmission = match serde_json::from_slice(&body) {
        Ok(form) => form,
        Err(e) => {
            tracing::error!(error = %e, "unreadable quote request body");
            return error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let result = match state.conn() {
        Ok(db) => quote::submit_quote(&db, form),
        Err(e) => return e.into_response(),
    };

    match result {
        Ok(stored) => Json(serde_json::json!({
            "success": true,
            "message": SUCCESS_MESSAGE,
            "id": stored.id,
        }))
        .into_response(),
        Err(QuoteError::MissingFields) => {
            tracing::warn!("quote request missing required fields");
            error(StatusCode::BAD_REQUEST, QuoteError::MissingFields.to_string())
        }
        Err(e @ QuoteError::Store(_)) => {
            tracing::error!(error = ?e, "error inserting quote request");
            error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
