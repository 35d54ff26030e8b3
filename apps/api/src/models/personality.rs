use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PersonalityAnalysisRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub video_filename: Option<String>,
    pub video_url: Option<String>,
    pub storage_path: Option<String>,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub conscientiousness: f64,
    pub neuroticism: f64,
    pub openness: f64,
    pub interview_score: f64,
    pub created_at: DateTime<Utc>,
}
