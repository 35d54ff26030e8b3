use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A stored resume with its embedding. One row per student.
#[derive(Debug, Clone, FromRow)]
pub struct ResumeEmbeddingRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub resume_text: String,
    pub embedding: Vec<f32>,
    pub filename: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored resume as returned to clients (the raw vector is omitted).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub resume_text: String,
    pub filename: String,
    pub metadata: Value,
    pub embedding_dimension: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
