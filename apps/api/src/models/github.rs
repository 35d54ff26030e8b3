use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct GithubDocumentRow {
    pub id: String,
    pub student_id: Uuid,
    pub text: String,
    pub metadata: Value,
    pub embedding: Vec<f32>,
}
