//! Survey Unlock - anonymous surveys whose responses are unlocked by a
//! one-time payment.
//!
//! The HTTP API, SQLite storage and payment provider integration live here;
//! the eligibility rule and client-side poller live in `survey-unlock-sdk`.

pub mod config;
pub mod crypto;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod rate_limit;
pub mod util;
