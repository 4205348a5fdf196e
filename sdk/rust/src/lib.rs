//! # Survey Unlock SDK
//!
//! Client-side half of the survey unlock flow: the shared eligibility rule,
//! starting a checkout, and waiting for the payment webhook after the user
//! returns from the payment page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use survey_unlock_sdk::{CheckoutParams, PollOptions, UnlockClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = UnlockClient::new("https://surveys.example.com", "session-token")?;
//!
//!     // Send the owner to the payment page
//!     let checkout = client
//!         .start_checkout(&CheckoutParams {
//!             survey_id: "5f0c...".into(),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Pay at {}", checkout.url);
//!
//!     // Later, on the return URL
//!     let ret = client.handle_return("https://surveys.example.com/dashboard?surveyId=5f0c...&unlocked=1")?;
//!     if let (Some(id), true) = (ret.survey_id, ret.unlocked) {
//!         let outcome = client.wait_for_paid(&id, PollOptions::default()).await;
//!         println!("{}", outcome.message());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! The server imports [`eligibility`] as well, so the unlock button shown by a
//! client and the check enforced at checkout never disagree.

pub mod client;
pub mod eligibility;
pub mod error;
pub mod poller;
pub mod types;

pub use client::{UnlockClient, parse_return_url};
pub use eligibility::{UNLOCK_GRACE_SECS, UnlockTerms, can_unlock, unlock_deadline};
pub use error::{Result, UnlockError, UnlockErrorCode};
pub use poller::{
    DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PaidFlagSource, PollOptions, PollOutcome,
    poll_until_paid, wait_for_paid,
};
pub use types::{CheckoutParams, CheckoutResult, ReturnParams, SurveyStatus};
