//! Waiting for the paid flag after the user returns from checkout.
//!
//! The provider redirect and the payment webhook are not synchronized: the user
//! can land back on the dashboard before the server has recorded the payment.
//! [`poll_until_paid`] bridges that gap by re-reading the paid flag until it
//! flips or a deadline passes. It only ever reflects state the webhook handler
//! already committed.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, MissedTickBehavior};

use crate::error::Result;

/// Default total time to wait for the webhook.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(12_000);

/// Default spacing between reads of the paid flag.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(800);

/// Anything that can report a survey's committed paid flag.
#[async_trait]
pub trait PaidFlagSource: Send + Sync {
    async fn is_paid(&self, survey_id: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollOptions {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_POLL_TIMEOUT,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Result of waiting for the paid flag.
///
/// A timeout is not a failed payment: the webhook may simply be late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The paid flag was observed as set
    Unlocked,
    /// The deadline passed before the flag was observed
    StillProcessing,
}

impl PollOutcome {
    pub fn is_unlocked(self) -> bool {
        matches!(self, PollOutcome::Unlocked)
    }

    /// Message to show the user for this outcome.
    pub fn message(self) -> &'static str {
        match self {
            PollOutcome::Unlocked => "Responses unlocked.",
            PollOutcome::StillProcessing => {
                "Payment received, still processing. Your responses will unlock shortly."
            }
        }
    }
}

/// Read the paid flag immediately, then every `options.interval`, until it is
/// observed as set or `options.timeout` elapses.
///
/// A failed read counts as "not yet". Dropping the returned future abandons
/// the wait and releases its timers.
pub async fn poll_until_paid<S>(source: &S, survey_id: &str, options: PollOptions) -> PollOutcome
where
    S: PaidFlagSource + ?Sized,
{
    // tokio::time::interval panics on a zero period
    let mut ticker = time::interval(options.interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let watch = async {
        loop {
            ticker.tick().await;
            if let Ok(true) = source.is_paid(survey_id).await {
                return;
            }
        }
    };

    match time::timeout(options.timeout, watch).await {
        Ok(()) => PollOutcome::Unlocked,
        Err(_) => PollOutcome::StillProcessing,
    }
}

/// Boolean form of [`poll_until_paid`].
pub async fn wait_for_paid<S>(source: &S, survey_id: &str, options: PollOptions) -> bool
where
    S: PaidFlagSource + ?Sized,
{
    poll_until_paid(source, survey_id, options).await.is_unlocked()
}
