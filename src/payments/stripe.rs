use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::error::{AppError, Result};

use super::{CheckoutProvider, CheckoutSession, UnlockCheckout};

type HmacSha256 = Hmac<Sha256>;

pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct CreateCheckoutSessionResponse {
    id: String,
    url: String,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: &str) -> Self {
        Self::with_api_base(secret_key, STRIPE_API_BASE)
    }

    /// Point the client at a different API host (stripe-mock, a proxy).
    pub fn with_api_base(secret_key: &str, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CheckoutProvider for StripeClient {
    fn provider_name(&self) -> &'static str {
        "stripe"
    }

    /// Create a one-time payment session with ad-hoc price data.
    async fn create_checkout_session(&self, checkout: &UnlockCheckout) -> Result<CheckoutSession> {
        let amount = checkout.price.amount_cents.to_string();

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("mode", "payment"),
                ("success_url", checkout.success_url.as_str()),
                ("cancel_url", checkout.cancel_url.as_str()),
                ("line_items[0][quantity]", "1"),
                ("line_items[0][price_data][currency]", checkout.price.currency.as_str()),
                ("line_items[0][price_data][unit_amount]", amount.as_str()),
                (
                    "line_items[0][price_data][product_data][name]",
                    checkout.price.product_name.as_str(),
                ),
                ("metadata[survey_id]", checkout.survey_id.as_str()),
                ("metadata[owner_id]", checkout.owner_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Provider(format!(
                "Stripe API error ({}): {}",
                status, error_text
            )));
        }

        let session: CreateCheckoutSessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Stripe response: {}", e)))?;

        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}

// ============ Webhook signatures ============

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,
    #[error("timestamp outside tolerance (age {0}s)")]
    StaleTimestamp(i64),
    #[error("no matching v1 signature")]
    Mismatch,
}

/// Verifies `Stripe-Signature` headers against the endpoint's signing secret.
#[derive(Clone)]
pub struct StripeWebhookVerifier {
    secret: String,
}

impl StripeWebhookVerifier {
    /// Maximum age of a webhook timestamp before it's rejected (in seconds).
    pub const TIMESTAMP_TOLERANCE_SECS: i64 = 300;
    /// Allowed clock skew for timestamps from the future.
    pub const FUTURE_SKEW_SECS: i64 = 60;

    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    pub fn verify(&self, payload: &[u8], header: &str) -> std::result::Result<(), SignatureError> {
        self.verify_at(payload, header, chrono::Utc::now().timestamp())
    }

    /// Verify `header` (`t=<ts>,v1=<hex>[,v1=<hex>...]`) over the raw `payload` as of `now`.
    /// Any matching `v1` entry is accepted so the secret can be rolled.
    pub fn verify_at(
        &self,
        payload: &[u8],
        header: &str,
        now: i64,
    ) -> std::result::Result<(), SignatureError> {
        let mut timestamp = None;
        let mut candidates = Vec::new();

        for part in header.split(',') {
            let part = part.trim();
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(s) = part.strip_prefix("v1=") {
                candidates.push(s);
            }
        }

        let timestamp_str = timestamp.ok_or(SignatureError::Malformed)?;
        if candidates.is_empty() {
            return Err(SignatureError::Malformed);
        }
        let timestamp: i64 = timestamp_str.parse().map_err(|_| SignatureError::Malformed)?;

        // `t` is untrusted; an overflowing age is as malformed as a non-numeric one
        let age = now.checked_sub(timestamp).ok_or(SignatureError::Malformed)?;
        if age > Self::TIMESTAMP_TOLERANCE_SECS || age < -Self::FUTURE_SKEW_SECS {
            return Err(SignatureError::StaleTimestamp(age));
        }

        let expected = hex::encode(self.sign(timestamp_str, payload));
        let expected = expected.as_bytes();

        // Signature length is not secret
        let matched = candidates
            .iter()
            .any(|c| c.len() == expected.len() && bool::from(expected.ct_eq(c.as_bytes())));

        if matched {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }

    fn sign(&self, timestamp: &str, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC can take key of any size");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

impl std::fmt::Debug for StripeWebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeWebhookVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ============ Events ============

/// Generic Stripe webhook event - object is parsed based on event_type
#[derive(Debug, Deserialize)]
pub struct StripeWebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// checkout.session.* object
#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    /// "paid", "unpaid" or "no_payment_required"
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: Option<UnlockMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnlockMetadata {
    pub survey_id: Option<String>,
    pub owner_id: Option<String>,
}
