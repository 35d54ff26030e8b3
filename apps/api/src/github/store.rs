//! Storage and retrieval of embedded GitHub documents.

use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::embedding::cosine_similarity;
use crate::github::documents::GithubDocument;
use crate::models::github::GithubDocumentRow;

#[derive(Debug, Clone, Serialize)]
pub struct GithubDocumentHit {
    pub id: String,
    pub text: String,
    pub metadata: Value,
    pub similarity: f32,
}

/// Replaces the student's stored portfolio with `documents` in one transaction.
/// Rows whose id is not in the new set are removed, the rest are upserted.
/// `documents` and `embeddings` are parallel slices.
pub async fn upsert_github_documents(
    pool: &PgPool,
    student_id: Uuid,
    documents: &[GithubDocument],
    embeddings: &[Vec<f32>],
) -> Result<usize, sqlx::Error> {
    let stored = documents.len().min(embeddings.len());
    let ids: Vec<String> = documents[..stored].iter().map(|d| d.id.clone()).collect();

    let mut tx = pool.begin().await?;

    let removed = sqlx::query(
        "DELETE FROM github_documents WHERE student_id = $1 AND NOT (id = ANY($2))",
    )
    .bind(student_id)
    .bind(&ids)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    for (doc, embedding) in documents.iter().zip(embeddings) {
        sqlx::query(
            r#"
            INSERT INTO github_documents (id, student_id, text, metadata, embedding)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (student_id, id) DO UPDATE SET
                text = EXCLUDED.text,
                metadata = EXCLUDED.metadata,
                embedding = EXCLUDED.embedding
            "#,
        )
        .bind(&doc.id)
        .bind(student_id)
        .bind(&doc.text)
        .bind(&doc.metadata)
        .bind(embedding)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!("Stored {stored} GitHub documents for student {student_id}, removed {removed} stale");
    Ok(stored)
}

/// The student's documents most similar to `query_embedding`.
pub async fn search_github_documents(
    pool: &PgPool,
    student_id: Uuid,
    query_embedding: &[f32],
    top_k: usize,
) -> Result<Vec<GithubDocumentHit>, sqlx::Error> {
    let rows = sqlx::query_as::<_, GithubDocumentRow>(
        "SELECT id, student_id, text, metadata, embedding FROM github_documents WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await?;

    Ok(rank_documents(rows, query_embedding, top_k))
}

fn rank_documents(
    rows: Vec<GithubDocumentRow>,
    query_embedding: &[f32],
    top_k: usize,
) -> Vec<GithubDocumentHit> {
    let mut hits: Vec<GithubDocumentHit> = rows
        .into_iter()
        .map(|row| GithubDocumentHit {
            similarity: cosine_similarity(&row.embedding, query_embedding),
            id: row.id,
            text: row.text,
            metadata: row.metadata,
        })
        .collect();

    hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    hits.truncate(top_k);
    hits
}
