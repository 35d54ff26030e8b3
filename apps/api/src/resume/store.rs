//! Resume embedding storage and similarity search.
//!
//! Embeddings live in `resume_embeddings.embedding` (REAL[]). Similarity is
//! computed in-process over all rows; the table holds one row per student.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::embedding::cosine_similarity;
use crate::models::resume::{ResumeEmbeddingRow, ResumeRecord};

/// A resume ranked against a query vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeHit {
    pub id: Uuid,
    pub student_id: Uuid,
    pub resume_text: String,
    pub filename: String,
    pub similarity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f32>,
}

/// Whether an upsert created a new row or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertAction {
    Created,
    Updated,
}

pub struct NewResumeEmbedding<'a> {
    pub student_id: Uuid,
    pub resume_text: &'a str,
    pub embedding: &'a [f32],
    pub filename: &'a str,
    pub metadata: &'a Value,
}

pub async fn get_resume_by_student_id(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Option<ResumeEmbeddingRow>, sqlx::Error> {
    sqlx::query_as::<_, ResumeEmbeddingRow>(
        "SELECT * FROM resume_embeddings WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_resume_record(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Option<ResumeRecord>, sqlx::Error> {
    sqlx::query_as::<_, ResumeRecord>(
        r#"
        SELECT id, student_id, resume_text, filename, metadata,
               COALESCE(array_length(embedding, 1), 0) AS embedding_dimension,
               created_at, updated_at
        FROM resume_embeddings
        WHERE student_id = $1
        "#,
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

/// Inserts the student's resume embedding, replacing any previous one.
pub async fn upsert_resume_embedding(
    pool: &PgPool,
    new: NewResumeEmbedding<'_>,
) -> Result<(Uuid, UpsertAction), sqlx::Error> {
    // xmax is zero only for a freshly inserted tuple.
    let (id, inserted): (Uuid, bool) = sqlx::query_as(
        r#"
        INSERT INTO resume_embeddings
            (id, student_id, resume_text, embedding, filename, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (student_id) DO UPDATE SET
            resume_text = EXCLUDED.resume_text,
            embedding = EXCLUDED.embedding,
            filename = EXCLUDED.filename,
            metadata = EXCLUDED.metadata,
            updated_at = now()
        RETURNING id, (xmax = 0) AS inserted
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.student_id)
    .bind(new.resume_text)
    .bind(new.embedding)
    .bind(new.filename)
    .bind(new.metadata)
    .fetch_one(pool)
    .await?;

    let action = if inserted {
        UpsertAction::Created
    } else {
        UpsertAction::Updated
    };
    info!(
        "Resume embedding {id} {:?} for student {}",
        action, new.student_id
    );
    Ok((id, action))
}

/// Deletes the student's resume embedding. Returns the number of rows removed.
pub async fn delete_resume_embedding(pool: &PgPool, student_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM resume_embeddings WHERE student_id = $1")
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Ranks every stored resume against `query_embedding`.
pub async fn search_similar_resumes(
    pool: &PgPool,
    query_embedding: &[f32],
    top_k: usize,
    threshold: f32,
) -> Result<Vec<ResumeHit>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ResumeEmbeddingRow>("SELECT * FROM resume_embeddings")
        .fetch_all(pool)
        .await?;
    Ok(rank_by_similarity(rows, query_embedding, top_k, threshold))
}

/// Ranks a single student's resume against `query_embedding`.
pub async fn search_student_resume(
    pool: &PgPool,
    student_id: Uuid,
    query_embedding: &[f32],
) -> Result<Vec<ResumeHit>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ResumeEmbeddingRow>(
        "SELECT * FROM resume_embeddings WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;
    Ok(rank_by_similarity(rows, query_embedding, usize::MAX, f32::MIN))
}

/// Scores rows by cosine similarity, drops those below `threshold`, and keeps
/// the best `top_k` in descending order.
pub fn rank_by_similarity(
    rows: Vec<ResumeEmbeddingRow>,
    query_embedding: &[f32],
    top_k: usize,
    threshold: f32,
) -> Vec<ResumeHit> {
    let mut hits: Vec<ResumeHit> = rows
        .into_iter()
        .map(|row| {
            let similarity = cosine_similarity(&row.embedding, query_embedding);
            ResumeHit {
                id: row.id,
                student_id: row.student_id,
                resume_text: row.resume_text,
                filename: row.filename,
                similarity,
                rerank_score: None,
            }
        })
        .filter(|hit| hit.similarity >= threshold)
        .collect();

    hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    hits.truncate(top_k);
    hits
}
