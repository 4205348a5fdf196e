use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use uuid::Uuid;

use crate::db::AppState;
use crate::error::WebhookError;
use crate::payments::{StripeCheckoutSession, StripeWebhookEvent};
use crate::util::now;

use super::common::{UnlockEvent, UnlockTarget, WebhookAck, process_event};

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /api/stripe/webhook
///
/// The raw body is verified before anything is parsed or stored.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, WebhookError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .ok_or(WebhookError::MissingSignature)?
        .to_str()
        .map_err(|_| WebhookError::SignatureInvalid("non-ASCII signature header".into()))?;

    state
        .webhook_verifier
        .verify(&body, signature)
        .map_err(|e| WebhookError::SignatureInvalid(e.to_string()))?;

    let event: StripeWebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
    let unlock = classify(&event)?;

    let mut conn = state.db.get()?;
    let outcome = process_event(&mut conn, &event.id, &event.event_type, &unlock, now())?;

    Ok(Json(WebhookAck::from(&outcome)))
}

/// Reduce a Stripe event to what it means for unlocking.
pub fn classify(event: &StripeWebhookEvent) -> Result<UnlockEvent, WebhookError> {
    match event.event_type.as_str() {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {}
        _ => return Ok(UnlockEvent::Ignored),
    }

    let session: StripeCheckoutSession = serde_json::from_value(event.data.object.clone())
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    // A completed session can still be awaiting an async payment method;
    // async_payment_succeeded follows once it clears.
    if event.event_type == "checkout.session.completed" {
        if let Some(status) = session.payment_status.as_deref() {
            if status != "paid" && status != "no_payment_required" {
                tracing::info!(
                    "Checkout session {} completed with payment_status={}; waiting for async payment",
                    session.id,
                    status
                );
                return Ok(UnlockEvent::Ignored);
            }
        }
    }

    let metadata = session.metadata.unwrap_or_default();
    let survey_id = metadata
        .survey_id
        .as_deref()
        .map(str::trim)
        .filter(|id| Uuid::parse_str(id).is_ok());

    Ok(match survey_id {
        Some(survey_id) => UnlockEvent::PaymentCompleted(UnlockTarget {
            survey_id: survey_id.to_string(),
            owner_id: metadata.owner_id.filter(|o| !o.is_empty()),
            session_id: session.id,
        }),
        None => UnlockEvent::MissingMetadata,
    })
}
