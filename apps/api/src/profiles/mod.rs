//! Read access to marketplace profiles and job postings.
//!
//! These tables are owned by the marketplace front end; this service only reads them.

use axum::{extract::State, Json};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{JobRow, ProfileRow, ProfileSummary};
use crate::state::AppState;

pub async fn get_profile(pool: &PgPool, id: Uuid) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Fetches summaries for many profiles at once. Unknown ids are skipped.
pub async fn get_profile_summaries(
    pool: &PgPool,
    ids: &[Uuid],
) -> Result<Vec<ProfileSummary>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    sqlx::query_as::<_, ProfileSummary>(
        "SELECT id, email, name, phone, skills, hobbies FROM profiles WHERE id = ANY($1)",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns jobs in the order their ids were requested.
pub async fn get_jobs_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<JobRow>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let mut jobs = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    jobs.sort_by_key(|j| ids.iter().position(|id| *id == j.id));
    Ok(jobs)
}

/// GET /profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileRow>>, AppError> {
    let profiles = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles ORDER BY created_at")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(profiles))
}
