//! Test utilities and fixtures for survey unlock integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

pub use survey_unlock::config::RateLimitConfig;
pub use survey_unlock::db::{AppState, DbPool, create_memory_pool, init_db, queries};
pub use survey_unlock::error::{AppError, Result};
pub use survey_unlock::handlers;
pub use survey_unlock::models::*;
pub use survey_unlock::payments::{
    CheckoutProvider, CheckoutSession, StripeWebhookVerifier, UnlockCheckout, UnlockPrice,
};

pub const TEST_SITE_URL: &str = "https://surveys.example.com";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const ONE_DAY: i64 = 24 * 60 * 60;

/// Checkout provider that records requests instead of calling Stripe.
#[derive(Default)]
pub struct FakeCheckoutProvider {
    pub sessions: Mutex<Vec<UnlockCheckout>>,
    pub fail: AtomicBool,
    counter: AtomicUsize,
}

impl FakeCheckoutProvider {
    pub fn calls(&self) -> Vec<UnlockCheckout> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn last(&self) -> UnlockCheckout {
        self.calls().pop().expect("no checkout session was created")
    }
}

#[async_trait]
impl CheckoutProvider for FakeCheckoutProvider {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn create_checkout_session(&self, checkout: &UnlockCheckout) -> Result<CheckoutSession> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Provider("simulated outage".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.sessions.lock().unwrap().push(checkout.clone());
        let id = format!("cs_test_{}", n);
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/c/pay/{}", id),
            id,
        })
    }
}

pub struct TestApp {
    pub state: AppState,
    pub provider: Arc<FakeCheckoutProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        let pool = create_memory_pool().expect("Failed to create pool");
        {
            let conn = pool.get().unwrap();
            init_db(&conn).expect("Failed to initialize schema");
        }
        let provider = Arc::new(FakeCheckoutProvider::default());
        let state = AppState {
            db: pool,
            checkout: provider.clone(),
            webhook_verifier: Arc::new(StripeWebhookVerifier::new(TEST_WEBHOOK_SECRET)),
            site_url: TEST_SITE_URL.to_string(),
            unlock_price: UnlockPrice::default(),
        };
        Self { state, provider }
    }

    pub fn router(&self) -> Router {
        handlers::app_router(RateLimitConfig::disabled()).with_state(self.state.clone())
    }

    /// Create a user with a live session. Returns (user, bearer token).
    pub fn user(&self, email: &str) -> (User, String) {
        let conn = self.state.db.get().unwrap();
        let user = queries::create_user(&conn, email).expect("Failed to create test user");
        let token = queries::create_session(&conn, &user.id).expect("Failed to create session");
        (user, token)
    }

    /// Create a fresh 24h survey owned by `owner_id`.
    pub fn survey(&self, owner_id: &str) -> Survey {
        self.survey_created_at(owner_id, chrono::Utc::now().timestamp())
    }

    /// Create a 24h survey as if created at `created_at` (expires a day later).
    pub fn survey_created_at(&self, owner_id: &str, created_at: i64) -> Survey {
        let conn = self.state.db.get().unwrap();
        queries::create_survey_at(&conn, owner_id, &test_survey_input(), created_at)
            .expect("Failed to create test survey")
    }

    pub fn get_survey(&self, id: &str) -> Survey {
        let conn = self.state.db.get().unwrap();
        queries::get_survey_by_id(&conn, id).unwrap().expect("survey missing")
    }

    pub fn ledger_count(&self) -> i64 {
        let conn = self.state.db.get().unwrap();
        queries::count_webhook_events(&conn).unwrap()
    }

    pub fn questions(&self, survey_id: &str) -> Vec<Question> {
        let conn = self.state.db.get().unwrap();
        queries::list_questions(&conn, survey_id).unwrap()
    }

    pub fn execute(&self, sql: &str) {
        let conn = self.state.db.get().unwrap();
        conn.execute_batch(sql).unwrap();
    }
}

pub fn test_survey_input() -> NewSurvey {
    NewSurvey {
        title: "Team retro".into(),
        duration: SurveyDuration::Day,
        questions: vec![
            "What went well this sprint?".into(),
            "What should we change?".into(),
        ],
        unlock_deadline: None,
    }
}

// ============ Webhooks ============

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn compute_stripe_signature(payload: &[u8], secret: &str, timestamp: &str) -> String {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// A valid `Stripe-Signature` header for `payload`, signed now.
pub fn signature_header(payload: &[u8]) -> String {
    let timestamp = now().to_string();
    let signature = compute_stripe_signature(payload, TEST_WEBHOOK_SECRET, &timestamp);
    format!("t={},v1={}", timestamp, signature)
}

pub fn checkout_completed_payload(event_id: &str, survey_id: &str, owner_id: Option<&str>) -> Vec<u8> {
    let mut metadata = json!({ "survey_id": survey_id });
    if let Some(owner_id) = owner_id {
        metadata["owner_id"] = json!(owner_id);
    }
    serde_json::to_vec(&json!({
        "id": event_id,
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": format!("cs_{}", event_id),
                "payment_status": "paid",
                "metadata": metadata
            }
        }
    }))
    .unwrap()
}

pub fn webhook_request(payload: Vec<u8>, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/stripe/webhook")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(payload)).unwrap()
}

// ============ HTTP helpers ============

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(serde_json::to_vec(body).unwrap())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}
