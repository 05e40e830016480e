pub mod calendar;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod quotes;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let functions = Router::new()
        .route(
            "/functions/submit-quote-request",
            post(quotes::submit_quote_request),
        )
        .layer(quotes::cors());

    Router::new()
        .route("/health", get(health::health))
        .route("/api/slots", get(calendar::get_slots))
        .route("/api/calendar/:date", get(calendar::get_day))
        .route("/api/bookings", post(calendar::create_booking))
        .route(
            "/api/bookings/:id/reschedule",
            post(calendar::reschedule_booking),
        )
        .route("/api/services", get(catalog::list_active))
        .route("/api/estimate", get(catalog::estimate))
        .route(
            "/api/admin/services",
            get(catalog::list_all).post(catalog::create),
        )
        .route("/api/admin/services/:id", put(catalog::update))
        .route("/api/admin/services/:id/toggle", post(catalog::toggle))
        .route("/api/admin/dashboard", get(dashboard::admin))
        .route("/api/me/dashboard", get(dashboard::customer))
        .route("/api/me/profile", post(dashboard::upsert_profile))
        .merge(functions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
