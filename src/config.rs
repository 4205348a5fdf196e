use std::env;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Per-IP request budgets for the public endpoints (requests per minute, 0 disables).
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// POST /api/checkout, which calls out to the payment provider
    pub checkout_rpm: u32,
    /// POST /api/s/{id}/responses
    pub submit_rpm: u32,
}

impl RateLimitConfig {
    pub fn disabled() -> Self {
        Self {
            checkout_rpm: 0,
            submit_rpm: 0,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            checkout_rpm: 10,
            submit_rpm: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Public origin of the web app; checkout redirects must stay on it
    pub site_url: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    pub unlock_price_cents: i64,
    pub unlock_currency: String,
    pub rate_limit: RateLimitConfig,
    pub dev_mode: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("APP_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = parse_var("PORT", 3000)?;

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));
        Url::parse(&site_url).map_err(|e| ConfigError::Invalid {
            name: "SITE_URL",
            reason: e.to_string(),
        })?;

        let stripe_secret_key = required("STRIPE_SECRET_KEY")?;
        let stripe_webhook_secret = required("STRIPE_WEBHOOK_SECRET")?;

        let unlock_price_cents: i64 = parse_var("UNLOCK_PRICE_CENTS", 199)?;
        if unlock_price_cents <= 0 {
            return Err(ConfigError::Invalid {
                name: "UNLOCK_PRICE_CENTS",
                reason: "must be positive".into(),
            });
        }

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            checkout_rpm: parse_var("RATE_LIMIT_CHECKOUT_RPM", defaults.checkout_rpm)?,
            submit_rpm: parse_var("RATE_LIMIT_SUBMIT_RPM", defaults.submit_rpm)?,
        };

        Ok(Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "survey_unlock.db".to_string()),
            site_url: site_url.trim_end_matches('/').to_string(),
            stripe_secret_key,
            stripe_webhook_secret,
            unlock_price_cents,
            unlock_currency: env::var("UNLOCK_CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or_else(|_| "usd".to_string()),
            rate_limit,
            dev_mode,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
