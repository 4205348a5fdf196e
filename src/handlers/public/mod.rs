mod checkout;
mod responses;
mod surveys;

pub use checkout::*;
pub use responses::*;
pub use surveys::*;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::db::AppState;
use crate::rate_limit;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(rate_limit: RateLimitConfig) -> Router<AppState> {
    let mut checkout = Router::new().route("/api/checkout", post(create_checkout));
    if let Some(layer) = rate_limit::strict_layer(rate_limit.checkout_rpm) {
        checkout = checkout.layer(layer);
    }

    let mut submit = Router::new().route("/api/s/{id}/responses", post(submit_responses));
    if let Some(layer) = rate_limit::standard_layer(rate_limit.submit_rpm) {
        submit = submit.layer(layer);
    }

    Router::new()
        .route("/health", get(health))
        .route("/api/surveys", post(create_survey))
        .route("/api/surveys/{id}", get(get_survey))
        .route("/api/surveys/{id}/status", get(get_survey_status))
        .route("/api/s/{id}", get(get_public_survey))
        .merge(checkout)
        .merge(submit)
}
