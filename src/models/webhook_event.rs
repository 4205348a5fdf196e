use serde::Serialize;

/// Dedupe ledger entry: one row per payment event id ever accepted.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookEventRecord {
    pub event_id: String,
    pub event_type: String,
    pub received_at: i64,
}
