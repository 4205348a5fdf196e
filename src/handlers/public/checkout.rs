use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{AppState, queries};
use crate::error::{AppError, OptionExt, Result, msg};
use crate::extractors::Json;
use crate::middleware::CurrentUser;
use crate::payments::UnlockCheckout;
use crate::util::{is_same_origin, now};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub survey_id: Option<String>,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// POST /api/checkout - open a payment page for unlocking a survey's responses.
///
/// Checks run in a fixed order and the first failure is returned: survey id,
/// authentication, existence, ownership, paid flag, unlock window, and
/// finally the redirect URLs.
/// Nothing is written locally; the survey only changes when the payment
/// webhook arrives.
pub async fn create_checkout(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let survey_id = request
        .survey_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest(msg::SURVEY_ID_REQUIRED.into()))?
        .to_string();

    let user = user.require()?;

    // Connection is released before calling the provider
    let survey = {
        let conn = state.db.get()?;
        queries::get_survey_by_id(&conn, &survey_id)?.or_not_found(msg::SURVEY_NOT_FOUND)?
    };

    if survey.owner_id != user.id {
        return Err(AppError::Forbidden(msg::NOT_SURVEY_OWNER.into()));
    }
    if survey.is_paid {
        return Err(AppError::AlreadyUnlocked);
    }
    if !survey.can_unlock(now()) {
        return Err(AppError::UnlockWindowClosed);
    }

    // Redirects are checked last
    for url in [&request.success_url, &request.cancel_url].into_iter().flatten() {
        if !is_same_origin(url, &state.site_url) {
            return Err(AppError::BadRequest(msg::REDIRECT_NOT_ALLOWED.into()));
        }
    }

    let checkout = UnlockCheckout {
        survey_id: survey.id.clone(),
        owner_id: user.id.clone(),
        price: state.unlock_price.clone(),
        success_url: request.success_url.unwrap_or_else(|| {
            format!("{}/dashboard?surveyId={}&unlocked=1", state.site_url, survey.id)
        }),
        cancel_url: request
            .cancel_url
            .unwrap_or_else(|| format!("{}/unlock/{}", state.site_url, survey.id)),
    };

    let session = state.checkout.create_checkout_session(&checkout).await?;

    tracing::info!(
        "Opened {} checkout session {} for survey {}",
        state.checkout.provider_name(),
        session.id,
        survey.id
    );

    Ok(Json(CheckoutResponse { url: session.url }))
}
