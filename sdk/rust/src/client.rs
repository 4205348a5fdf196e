//! HTTP client for the survey unlock API

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, UnlockError, UnlockErrorCode};
use crate::poller::{self, PaidFlagSource, PollOptions, PollOutcome};
use crate::types::{CheckoutParams, CheckoutResult, ReturnParams, SurveyStatus};

/// Authenticated client for one survey owner.
#[derive(Clone)]
pub struct UnlockClient {
    base_url: String,
    token: String,
    http: HttpClient,
}

impl UnlockClient {
    /// Create a client against `base_url` (e.g. `https://surveys.example.com`)
    /// using the owner's session token.
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let parsed =
            Url::parse(base_url).map_err(|_| UnlockError::validation("Invalid base URL"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(UnlockError::validation("Base URL must be http or https"));
        }
        if token.is_empty() {
            return Err(UnlockError::validation("Session token is required"));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http: HttpClient::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a checkout session for `params.survey_id` and return the payment
    /// page URL. The server rejects surveys that are already paid or past
    /// their unlock window.
    pub async fn start_checkout(&self, params: &CheckoutParams) -> Result<CheckoutResult> {
        if params.survey_id.trim().is_empty() {
            return Err(UnlockError::validation("surveyId is required"));
        }
        self.post("/api/checkout", params).await
    }

    /// Read the committed paid flag and unlock eligibility.
    pub async fn survey_status(&self, survey_id: &str) -> Result<SurveyStatus> {
        let path = format!("/api/surveys/{}/status", urlencoding::encode(survey_id));
        self.get(&path).await
    }

    /// Wait for the payment webhook to land; see [`poller::poll_until_paid`].
    pub async fn wait_for_paid(&self, survey_id: &str, options: PollOptions) -> PollOutcome {
        poller::poll_until_paid(self, survey_id, options).await
    }

    /// Parse the URL the payment provider redirected back to.
    pub fn handle_return(&self, url: &str) -> Result<ReturnParams> {
        parse_return_url(url)
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| UnlockError::network(e.to_string()))?;

        handle_response(response).await
    }

    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| UnlockError::network(e.to_string()))?;

        handle_response(response).await
    }
}

#[async_trait]
impl PaidFlagSource for UnlockClient {
    async fn is_paid(&self, survey_id: &str) -> Result<bool> {
        Ok(self.survey_status(survey_id).await?.is_paid)
    }
}

impl std::fmt::Debug for UnlockClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Extract `surveyId` and `unlocked=1` from a checkout return URL.
pub fn parse_return_url(url: &str) -> Result<ReturnParams> {
    let parsed = Url::parse(url).map_err(|_| UnlockError::validation("Invalid return URL"))?;

    let mut params = ReturnParams {
        survey_id: None,
        unlocked: false,
    };

    for (key, value) in parsed.query_pairs() {
        match key.as_ref() {
            "surveyId" if !value.is_empty() => params.survey_id = Some(value.into_owned()),
            "unlocked" => params.unlocked = value == "1",
            _ => {}
        }
    }

    Ok(params)
}

async fn handle_response<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status().as_u16();

    if !response.status().is_success() {
        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<String>,
            code: Option<String>,
        }

        let body: ErrorResponse = response.json().await.unwrap_or(ErrorResponse {
            error: None,
            code: None,
        });

        let code = body
            .code
            .as_deref()
            .and_then(UnlockErrorCode::from_server_code)
            .unwrap_or_else(|| UnlockErrorCode::from_status(status));
        let message = body
            .error
            .unwrap_or_else(|| format!("Request failed: {}", status));

        return Err(UnlockError::with_status(code, message, status));
    }

    response
        .json()
        .await
        .map_err(|e| UnlockError::network(e.to_string()))
}
