pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::applicants::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Applicant API
        .route("/api/v1/applicants", post(handlers::ingest_applicants))
        .route("/api/v1/applicants", get(handlers::list_applicants))
        .route("/api/v1/applicants/:id", get(handlers::get_applicant))
        .route("/api/v1/applicants/:id", put(handlers::update_applicant))
        .route("/api/v1/applicants/:id", delete(handlers::delete_applicant))
        .route(
            "/api/v1/applicants/search",
            post(handlers::search_applicants),
        )
        .with_state(state)
}
