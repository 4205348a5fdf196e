pub mod public;
pub mod webhooks;

use axum::Router;

use crate::config::RateLimitConfig;
use crate::db::AppState;

/// All API routes, without state or tracing applied.
pub fn app_router(rate_limit: RateLimitConfig) -> Router<AppState> {
    Router::new()
        // Public and owner endpoints (bearer auth where required)
        .merge(public::router(rate_limit))
        // Payment provider callbacks (signature auth)
        .merge(webhooks::router())
}
