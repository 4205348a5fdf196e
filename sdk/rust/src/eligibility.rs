//! Unlock eligibility.
//!
//! The server enforces this before opening a checkout session and clients use
//! it to decide whether to offer the unlock button. Both import it from here so
//! the two sides always agree.

/// How long after `expires_at` a survey stays unlockable when no explicit
/// deadline is stored.
pub const UNLOCK_GRACE_SECS: i64 = 30 * 24 * 60 * 60;

/// The survey fields eligibility depends on. Timestamps are unix seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnlockTerms {
    pub is_paid: bool,
    /// End of response collection
    pub expires_at: Option<i64>,
    /// Explicit unlock deadline, overrides the derived one
    pub unlock_deadline: Option<i64>,
}

impl UnlockTerms {
    /// The effective deadline, or `None` when the survey has neither an
    /// explicit deadline nor an expiry.
    pub fn deadline(&self) -> Option<i64> {
        self.unlock_deadline
            .or_else(|| self.expires_at.map(|exp| exp + UNLOCK_GRACE_SECS))
    }

    pub fn can_unlock(&self, now: i64) -> bool {
        can_unlock(self, now)
    }
}

/// Effective unlock deadline for `terms`; see [`UnlockTerms::deadline`].
pub fn unlock_deadline(terms: &UnlockTerms) -> Option<i64> {
    terms.deadline()
}

/// Whether an unpaid survey can still be unlocked at `now`.
///
/// Paid surveys have nothing left to unlock. Surveys without any deadline are
/// always unlockable.
pub fn can_unlock(terms: &UnlockTerms, now: i64) -> bool {
    if terms.is_paid {
        return false;
    }

    match terms.deadline() {
        Some(deadline) => now < deadline,
        None => true,
    }
}
