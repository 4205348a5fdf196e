use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::util::extract_bearer_token;

/// The caller's identity, resolved from a bearer session token.
///
/// Resolution never rejects on its own; handlers decide when identity is
/// required so they can order their precondition checks.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn require(self) -> Result<User> {
        self.0.ok_or(AppError::Unauthenticated)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(token) = extract_bearer_token(&parts.headers) else {
            return Ok(CurrentUser(None));
        };

        let conn = state.db.get()?;
        let user = queries::get_user_by_session_token(&conn, token)?;
        if user.is_none() {
            tracing::debug!("Unknown session token presented");
        }

        Ok(CurrentUser(user))
    }
}
