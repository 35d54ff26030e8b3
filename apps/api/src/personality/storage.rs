//! Interview video uploads and persisted analysis results.

use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::personality::PersonalityAnalysisRow;
use crate::personality::traits::TraitResult;

/// `personality/<student|anonymous>_<YYYYmmdd_HHMMSS><ext>`
pub fn video_storage_key(student_id: Option<Uuid>, filename: &str, now: DateTime<Utc>) -> String {
    let owner = student_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!(
        "personality/{owner}_{}{ext}",
        now.format("%Y%m%d_%H%M%S")
    )
}

pub fn public_video_url(public_base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{bucket}/{key}", public_base.trim_end_matches('/'))
}

pub async fn upload_video(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    video: Bytes,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(video))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("video upload failed: {e}")))?;

    info!("Uploaded interview video to s3://{bucket}/{key}");
    Ok(())
}

pub struct NewAnalysis<'a> {
    pub student_id: Uuid,
    pub video_filename: &'a str,
    pub video_url: Option<&'a str>,
    pub storage_path: Option<&'a str>,
    /// Six results in trait order.
    pub results: &'a [TraitResult],
}

pub async fn insert_analysis(pool: &PgPool, analysis: NewAnalysis<'_>) -> Result<Uuid, AppError> {
    let raw: Vec<f64> = analysis.results.iter().map(|r| r.raw_score).collect();
    let &[extraversion, agreeableness, conscientiousness, neuroticism, openness, interview_score] =
        raw.as_slice()
    else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "expected 6 trait results, got {}",
            raw.len()
        )));
    };

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO personality_analyses
            (id, student_id, video_filename, video_url, storage_path,
             extraversion, agreeableness, conscientiousness, neuroticism, openness, interview_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(id)
    .bind(analysis.student_id)
    .bind(analysis.video_filename)
    .bind(analysis.video_url)
    .bind(analysis.storage_path)
    .bind(extraversion)
    .bind(agreeableness)
    .bind(conscientiousness)
    .bind(neuroticism)
    .bind(openness)
    .bind(interview_score)
    .execute(pool)
    .await?;

    Ok(id)
}

/// All analyses for a student, newest first.
pub async fn get_analysis_history(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Vec<PersonalityAnalysisRow>, sqlx::Error> {
    sqlx::query_as::<_, PersonalityAnalysisRow>(
        "SELECT * FROM personality_analyses WHERE student_id = $1 ORDER BY created_at DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_video_storage_key() {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();
        let id = Uuid::nil();
        assert_eq!(
            video_storage_key(Some(id), "interview.mp4", now),
            format!("personality/{id}_20250307_140509.mp4")
        );
        assert_eq!(
            video_storage_key(None, "clip", now),
            "personality/anonymous_20250307_140509"
        );
    }

    #[test]
    fn test_public_video_url() {
        assert_eq!(
            public_video_url("http://localhost:9000/", "videos", "personality/a.mp4"),
            "http://localhost:9000/videos/personality/a.mp4"
        );
    }
}
