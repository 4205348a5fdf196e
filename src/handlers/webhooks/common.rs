//! Provider-independent processing of payment events.
//!
//! Recording the event id in the dedupe ledger and flipping the survey's
//! paid flag happen in one transaction: either both land or neither does,
//! so a failed delivery can be safely redelivered.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::queries;
use crate::error::WebhookError;

/// The survey a payment is for, taken from checkout session metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockTarget {
    pub survey_id: String,
    /// Owner recorded when the session was opened; cross-checked when present
    pub owner_id: Option<String>,
    /// Provider session id, for logs
    pub session_id: String,
}

/// A verified event, reduced to what matters for unlocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockEvent {
    /// Payment completed for the target survey
    PaymentCompleted(UnlockTarget),
    /// Payment completed but the metadata does not name a survey
    MissingMetadata,
    /// Not relevant to unlocking
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event id already in the ledger; nothing done
    Duplicate,
    /// This event flipped the survey to paid
    Unlocked(String),
    /// Survey was already paid by an earlier event
    AlreadyPaid(String),
    /// Metadata names a survey that no longer exists
    SurveyNotFound(String),
    /// Metadata owner differs from the survey owner; not applied
    OwnerMismatch(String),
    Ignored,
}

impl WebhookOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, WebhookOutcome::Duplicate)
    }
}

/// Acknowledgement body returned to the provider.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

impl From<&WebhookOutcome> for WebhookAck {
    fn from(outcome: &WebhookOutcome) -> Self {
        Self {
            received: true,
            duplicate: outcome.is_duplicate(),
        }
    }
}

/// Apply one verified event.
///
/// The ledger row is written first; a duplicate id short-circuits with no
/// side effects. `MissingMetadata` keeps the ledger row (redelivery would
/// never succeed) and is reported as an error. Any storage failure rolls back
/// the whole transaction.
pub fn process_event(
    conn: &mut Connection,
    event_id: &str,
    event_type: &str,
    event: &UnlockEvent,
    now: i64,
) -> Result<WebhookOutcome, WebhookError> {
    let tx = conn.transaction()?;

    if !queries::try_record_webhook_event(&tx, event_id, event_type)? {
        tracing::info!("Duplicate webhook event {} ignored", event_id);
        return Ok(WebhookOutcome::Duplicate);
    }

    let outcome = match event {
        UnlockEvent::Ignored => {
            tracing::debug!("Ignoring {} event {}", event_type, event_id);
            WebhookOutcome::Ignored
        }
        UnlockEvent::MissingMetadata => {
            tx.commit()?;
            return Err(WebhookError::MissingMetadata(event_id.to_string()));
        }
        UnlockEvent::PaymentCompleted(target) => apply_payment(&tx, event_id, target, now)?,
    };

    tx.commit()?;
    Ok(outcome)
}

fn apply_payment(
    conn: &Connection,
    event_id: &str,
    target: &UnlockTarget,
    now: i64,
) -> Result<WebhookOutcome, WebhookError> {
    let survey_id = target.survey_id.clone();

    let Some(survey) = queries::get_survey_by_id(conn, &survey_id)? else {
        tracing::warn!(
            "Payment event {} (session {}) names unknown survey {}; acknowledging",
            event_id,
            target.session_id,
            survey_id
        );
        return Ok(WebhookOutcome::SurveyNotFound(survey_id));
    };

    if let Some(owner_id) = &target.owner_id {
        if owner_id != &survey.owner_id {
            tracing::error!(
                "Payment event {} (session {}) owner {} does not own survey {}; not applied",
                event_id,
                target.session_id,
                owner_id,
                survey_id
            );
            return Ok(WebhookOutcome::OwnerMismatch(survey_id));
        }
    }

    if queries::mark_survey_paid(conn, &survey_id, now)? {
        tracing::info!(
            "Survey {} unlocked by event {} (session {})",
            survey_id,
            event_id,
            target.session_id
        );
        Ok(WebhookOutcome::Unlocked(survey_id))
    } else {
        tracing::info!(
            "Survey {} already unlocked; event {} has no effect",
            survey_id,
            event_id
        );
        Ok(WebhookOutcome::AlreadyPaid(survey_id))
    }
}
