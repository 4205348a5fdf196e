mod stripe;

pub use stripe::*;

use async_trait::async_trait;

use crate::error::Result;

/// Price of unlocking one survey's responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockPrice {
    pub amount_cents: i64,
    /// ISO currency code, lowercase
    pub currency: String,
    pub product_name: String,
}

impl Default for UnlockPrice {
    fn default() -> Self {
        Self {
            amount_cents: 199,
            currency: "usd".to_string(),
            product_name: "Unlock survey responses".to_string(),
        }
    }
}

/// Everything needed to open a one-time payment session for an unlock.
/// `survey_id` and `owner_id` round-trip through the provider as metadata.
#[derive(Debug, Clone)]
pub struct UnlockCheckout {
    pub survey_id: String,
    pub owner_id: String,
    pub price: UnlockPrice,
    pub success_url: String,
    pub cancel_url: String,
}

/// A session opened at the provider.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Payment provider seam for opening hosted checkout pages.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn create_checkout_session(&self, checkout: &UnlockCheckout) -> Result<CheckoutSession>;
}
