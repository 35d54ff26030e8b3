use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Interview or coffee-chat proposal. `proposed_slots` / `confirmed_slot`
/// hold `{"date": "YYYY-MM-DD", "time": "HH:MM"}` objects.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MeetingProposalRow {
    pub id: Uuid,
    pub kind: String,
    pub recruiter_id: Uuid,
    pub student_id: Uuid,
    pub job_id: Option<Uuid>,
    pub proposed_slots: Value,
    pub confirmed_slot: Option<Value>,
    pub status: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
