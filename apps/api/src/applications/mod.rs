//! Job applications and their review status.
//!
//! `pending` is the only open state; a recruiter moves it to `accepted` or
//! `rejected` exactly once.

pub mod handlers;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicantRow, ApplicationRow};
use crate::profiles::get_job;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (
                ApplicationStatus::Pending,
                ApplicationStatus::Accepted | ApplicationStatus::Rejected
            )
        )
    }
}

pub struct NewApplication {
    pub job_id: Uuid,
    pub student_id: Uuid,
    pub cover_letter: Option<String>,
}

/// `NotFound` for an unknown job, `Conflict` when the student already applied.
pub async fn create_application(
    pool: &PgPool,
    new: NewApplication,
) -> Result<ApplicationRow, AppError> {
    if get_job(pool, new.job_id).await?.is_none() {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    let inserted = sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications (id, job_id, student_id, status, cover_letter)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (job_id, student_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.job_id)
    .bind(new.student_id)
    .bind(ApplicationStatus::Pending.as_str())
    .bind(new.cover_letter)
    .fetch_optional(pool)
    .await?;

    let row = inserted.ok_or_else(|| {
        AppError::Conflict("Student has already applied to this job".to_string())
    })?;
    info!(
        "Student {} applied to job {} (application {})",
        row.student_id, row.job_id, row.id
    );
    Ok(row)
}

/// Applications for a job with applicant contact details, newest first.
pub async fn list_applicants(
    pool: &PgPool,
    job_id: Uuid,
) -> Result<Vec<ApplicantRow>, AppError> {
    if get_job(pool, job_id).await?.is_none() {
        return Err(AppError::NotFound("Job not found".to_string()));
    }

    let rows = sqlx::query_as::<_, ApplicantRow>(
        r#"
        SELECT a.id, a.job_id, a.student_id, a.status, a.cover_letter, a.created_at,
               p.name, p.email
        FROM applications a
        LEFT JOIN profiles p ON p.id = a.student_id
        WHERE a.job_id = $1
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn update_application_status(
    pool: &PgPool,
    id: Uuid,
    next: ApplicationStatus,
) -> Result<ApplicationRow, AppError> {
    let current = sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    let current_status = ApplicationStatus::parse(&current.status).ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "application {id} has unknown status '{}'",
            current.status
        ))
    })?;
    if !current_status.can_transition_to(next) {
        return Err(transition_conflict(current_status, next));
    }

    // Conditional on the status we validated against.
    let updated = sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET status = $2, updated_at = now()
        WHERE id = $1 AND status = $3
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(next.as_str())
    .bind(current_status.as_str())
    .fetch_optional(pool)
    .await?;

    let row = updated.ok_or_else(|| transition_conflict(current_status, next))?;
    info!("Application {id} moved to {}", next.as_str());
    Ok(row)
}

fn transition_conflict(from: ApplicationStatus, to: ApplicationStatus) -> AppError {
    AppError::Conflict(format!(
        "Cannot change application status from {} to {}",
        from.as_str(),
        to.as_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn test_only_pending_transitions() {
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Pending));
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [Pending, Accepted, Rejected] {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("withdrawn"), None);
    }

    #[test]
    fn test_transition_conflict_message() {
        match transition_conflict(Accepted, Rejected) {
            AppError::Conflict(msg) => {
                assert_eq!(msg, "Cannot change application status from accepted to rejected")
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    async fn insert_job(pool: &PgPool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO jobs (id, recruiter_id, title, description) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(Uuid::new_v4())
            .bind("Backend Engineer")
            .bind("Rust, Postgres, axum")
            .execute(pool)
            .await
            .unwrap();
        id
    }

    fn application(job_id: Uuid, student_id: Uuid) -> NewApplication {
        NewApplication {
            job_id,
            student_id,
            cover_letter: Some("Dear hiring team".to_string()),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_application_conflicts(pool: PgPool) {
        let job_id = insert_job(&pool).await;
        let student_id = Uuid::new_v4();

        let row = create_application(&pool, application(job_id, student_id))
            .await
            .unwrap();
        assert_eq!(row.status, "pending");

        assert!(matches!(
            create_application(&pool, application(job_id, student_id)).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            create_application(&pool, application(Uuid::new_v4(), student_id)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_decided_application_cannot_change(pool: PgPool) {
        let job_id = insert_job(&pool).await;
        let row = create_application(&pool, application(job_id, Uuid::new_v4()))
            .await
            .unwrap();

        let accepted = update_application_status(&pool, row.id, Accepted).await.unwrap();
        assert_eq!(accepted.status, "accepted");

        match update_application_status(&pool, row.id, Rejected).await {
            Err(AppError::Conflict(msg)) => {
                assert_eq!(msg, "Cannot change application status from accepted to rejected")
            }
            other => panic!("expected Conflict, got {other:?}"),
        }
        assert!(matches!(
            update_application_status(&pool, Uuid::new_v4(), Accepted).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_applicants_joins_profiles(pool: PgPool) {
        let job_id = insert_job(&pool).await;
        let student_id = Uuid::new_v4();
        sqlx::query("INSERT INTO profiles (id, name, email) VALUES ($1, $2, $3)")
            .bind(student_id)
            .bind("Ada Lovelace")
            .bind("ada@example.com")
            .execute(&pool)
            .await
            .unwrap();
        create_application(&pool, application(job_id, student_id)).await.unwrap();
        create_application(&pool, application(job_id, Uuid::new_v4())).await.unwrap();

        let applicants = list_applicants(&pool, job_id).await.unwrap();
        assert_eq!(applicants.len(), 2);
        let ada = applicants.iter().find(|a| a.student_id == student_id).unwrap();
        assert_eq!(ada.name.as_deref(), Some("Ada Lovelace"));
        assert!(applicants.iter().any(|a| a.name.is_none()));

        assert!(matches!(
            list_applicants(&pool, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
