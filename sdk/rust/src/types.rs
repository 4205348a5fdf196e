//! Wire types shared with the survey unlock server

use serde::{Deserialize, Serialize};

use crate::eligibility::{UnlockTerms, unlock_deadline};

/// Paid flag and unlock eligibility of one survey, as returned by
/// `GET /api/surveys/{id}/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStatus {
    pub survey_id: String,
    pub is_paid: bool,
    pub paid_at: Option<i64>,
    pub expires_at: Option<i64>,
    /// Effective unlock deadline (explicit, or derived from `expires_at`)
    pub unlock_deadline: Option<i64>,
    pub can_unlock: bool,
}

impl SurveyStatus {
    /// Build a status snapshot, evaluating eligibility at `now`.
    pub fn from_terms(survey_id: &str, terms: &UnlockTerms, paid_at: Option<i64>, now: i64) -> Self {
        Self {
            survey_id: survey_id.to_string(),
            is_paid: terms.is_paid,
            paid_at,
            expires_at: terms.expires_at,
            unlock_deadline: unlock_deadline(terms),
            can_unlock: terms.can_unlock(now),
        }
    }
}

/// Parameters for starting an unlock checkout.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutParams {
    pub survey_id: String,
    /// Where the provider sends the user after paying (defaults to the dashboard)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    /// Where the provider sends the user after cancelling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
}

/// Result from starting a checkout session
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResult {
    /// Payment page to redirect the user to
    pub url: String,
}

/// Query parameters found on the URL the payment provider redirected back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnParams {
    pub survey_id: Option<String>,
    /// True when the user came back from a completed checkout (`unlocked=1`)
    pub unlocked: bool,
}
