//! Meeting proposals. Interviews and coffee chats share one model: a recruiter
//! proposes slots, the student confirms one of them, either side can cancel
//! while the proposal is open.
//!
//! Status transitions are single-row conditional updates (`WHERE status =
//! 'proposed'`), so two concurrent confirmations cannot both succeed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::schedule::MeetingProposalRow;
use crate::schedule::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    Interview,
    CoffeeChat,
}

impl MeetingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeetingKind::Interview => "interview",
            MeetingKind::CoffeeChat => "coffee_chat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Proposed,
    Confirmed,
    Cancelled,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Proposed => "proposed",
            ProposalStatus::Confirmed => "confirmed",
            ProposalStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewProposal {
    pub kind: MeetingKind,
    pub recruiter_id: Uuid,
    pub student_id: Uuid,
    pub job_id: Option<Uuid>,
    pub slots: Vec<TimeSlot>,
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProposalFilter {
    pub student_id: Option<Uuid>,
    pub recruiter_id: Option<Uuid>,
    pub kind: Option<MeetingKind>,
}

/// Validates every slot and drops repeats, keeping first occurrences.
pub fn normalize_slots(slots: Vec<TimeSlot>) -> Result<Vec<TimeSlot>, AppError> {
    if slots.is_empty() {
        return Err(AppError::Validation(
            "At least one slot must be proposed".to_string(),
        ));
    }

    let mut unique: Vec<TimeSlot> = Vec::with_capacity(slots.len());
    for slot in slots {
        slot.parse()?;
        if !unique.contains(&slot) {
            unique.push(slot);
        }
    }
    Ok(unique)
}

/// `Validation` unless `slot` is one of the proposal's slots.
pub fn ensure_slot_proposed(proposed: &Value, slot: &TimeSlot) -> Result<(), AppError> {
    let proposed: Vec<TimeSlot> = serde_json::from_value(proposed.clone())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt proposed_slots: {e}")))?;

    if proposed.contains(slot) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Slot {} {} was not proposed",
            slot.date, slot.time
        )))
    }
}

pub async fn get_proposal(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<MeetingProposalRow>, sqlx::Error> {
    sqlx::query_as::<_, MeetingProposalRow>("SELECT * FROM meeting_proposals WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_proposal(
    pool: &PgPool,
    new: NewProposal,
) -> Result<MeetingProposalRow, AppError> {
    let slots = normalize_slots(new.slots)?;
    let proposed_slots =
        serde_json::to_value(&slots).map_err(|e| AppError::Internal(e.into()))?;

    let row = sqlx::query_as::<_, MeetingProposalRow>(
        r#"
        INSERT INTO meeting_proposals
            (id, kind, recruiter_id, student_id, job_id, proposed_slots, status, note)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.kind.as_str())
    .bind(new.recruiter_id)
    .bind(new.student_id)
    .bind(new.job_id)
    .bind(&proposed_slots)
    .bind(ProposalStatus::Proposed.as_str())
    .bind(new.note)
    .fetch_one(pool)
    .await?;

    info!(
        "Created {} proposal {} with {} slots",
        row.kind,
        row.id,
        slots.len()
    );
    Ok(row)
}

/// Confirms one of the proposed slots. `Conflict` if the proposal is no longer open.
pub async fn confirm_proposal(
    pool: &PgPool,
    id: Uuid,
    slot: TimeSlot,
) -> Result<MeetingProposalRow, AppError> {
    let proposal = get_proposal(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Proposal not found".to_string()))?;
    ensure_slot_proposed(&proposal.proposed_slots, &slot)?;

    let confirmed_slot = serde_json::to_value(&slot).map_err(|e| AppError::Internal(e.into()))?;
    let updated = sqlx::query_as::<_, MeetingProposalRow>(
        r#"
        UPDATE meeting_proposals
        SET status = $2, confirmed_slot = $3, updated_at = now()
        WHERE id = $1 AND status = $4
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(ProposalStatus::Confirmed.as_str())
    .bind(&confirmed_slot)
    .bind(ProposalStatus::Proposed.as_str())
    .fetch_optional(pool)
    .await?;

    let Some(row) = updated else {
        // Lost a race; report the status that won.
        let status = get_proposal(pool, id)
            .await?
            .map_or(proposal.status, |current| current.status);
        return Err(AppError::Conflict(format!("Proposal is already {status}")));
    };
    info!("Confirmed proposal {id} for {} {}", slot.date, slot.time);
    Ok(row)
}

pub async fn cancel_proposal(pool: &PgPool, id: Uuid) -> Result<MeetingProposalRow, AppError> {
    let updated = sqlx::query_as::<_, MeetingProposalRow>(
        r#"
        UPDATE meeting_proposals
        SET status = $2, updated_at = now()
        WHERE id = $1 AND status = $3
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(ProposalStatus::Cancelled.as_str())
    .bind(ProposalStatus::Proposed.as_str())
    .fetch_optional(pool)
    .await?;

    match updated {
        Some(row) => {
            info!("Cancelled proposal {id}");
            Ok(row)
        }
        None => match get_proposal(pool, id).await? {
            Some(existing) => Err(AppError::Conflict(format!(
                "Proposal is already {}",
                existing.status
            ))),
            None => Err(AppError::NotFound("Proposal not found".to_string())),
        },
    }
}

/// Proposals for a student and/or recruiter, newest first.
pub async fn list_proposals(
    pool: &PgPool,
    filter: &ProposalFilter,
) -> Result<Vec<MeetingProposalRow>, AppError> {
    if filter.student_id.is_none() && filter.recruiter_id.is_none() {
        return Err(AppError::Validation(
            "student_id or recruiter_id is required".to_string(),
        ));
    }

    let rows = sqlx::query_as::<_, MeetingProposalRow>(
        r#"
        SELECT * FROM meeting_proposals
        WHERE ($1::uuid IS NULL OR student_id = $1)
          AND ($2::uuid IS NULL OR recruiter_id = $2)
          AND ($3::text IS NULL OR kind = $3)
        ORDER BY created_at DESC
        "#,
    )
    .bind(filter.student_id)
    .bind(filter.recruiter_id)
    .bind(filter.kind.map(MeetingKind::as_str))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slot(date: &str, time: &str) -> TimeSlot {
        TimeSlot {
            date: date.to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn test_normalize_slots_dedupes_in_order() {
        let slots = normalize_slots(vec![
            slot("2025-03-10", "09:00"),
            slot("2025-03-11", "09:00"),
            slot("2025-03-10", "09:00"),
        ])
        .unwrap();
        assert_eq!(
            slots,
            vec![slot("2025-03-10", "09:00"), slot("2025-03-11", "09:00")]
        );
    }

    #[test]
    fn test_normalize_slots_rejects_empty_and_malformed() {
        assert!(matches!(
            normalize_slots(vec![]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            normalize_slots(vec![slot("2025-03-10", "9am")]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_ensure_slot_proposed() {
        let proposed = json!([
            {"date": "2025-03-10", "time": "09:00"},
            {"date": "2025-03-11", "time": "14:30"}
        ]);
        assert!(ensure_slot_proposed(&proposed, &slot("2025-03-11", "14:30")).is_ok());
        assert!(matches!(
            ensure_slot_proposed(&proposed, &slot("2025-03-12", "09:00")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_kind_serialization() {
        let kind: MeetingKind = serde_json::from_str(r#""coffee_chat""#).unwrap();
        assert_eq!(kind, MeetingKind::CoffeeChat);
        assert_eq!(kind.as_str(), "coffee_chat");
        assert!(serde_json::from_str::<MeetingKind>(r#""lunch""#).is_err());
    }

    fn new_proposal(student_id: Uuid, recruiter_id: Uuid) -> NewProposal {
        NewProposal {
            kind: MeetingKind::CoffeeChat,
            recruiter_id,
            student_id,
            job_id: None,
            slots: vec![slot("2025-03-10", "09:00"), slot("2025-03-11", "14:30")],
            note: Some("Intro chat".to_string()),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_second_confirm_conflicts(pool: PgPool) {
        let proposal = create_proposal(&pool, new_proposal(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(proposal.status, "proposed");

        let confirmed = confirm_proposal(&pool, proposal.id, slot("2025-03-11", "14:30"))
            .await
            .unwrap();
        assert_eq!(confirmed.status, "confirmed");
        assert_eq!(
            confirmed.confirmed_slot,
            Some(json!({"date": "2025-03-11", "time": "14:30"}))
        );

        match confirm_proposal(&pool, proposal.id, slot("2025-03-10", "09:00")).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Proposal is already confirmed"),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_confirms_only_one_wins(pool: PgPool) {
        let proposal = create_proposal(&pool, new_proposal(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            confirm_proposal(&pool, proposal.id, slot("2025-03-10", "09:00")),
            confirm_proposal(&pool, proposal.id, slot("2025-03-11", "14:30")),
        );
        let wins = [&a, &b].iter().filter(|r| r.is_ok()).count();
        let conflicts = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(AppError::Conflict(_))))
            .count();
        assert_eq!((wins, conflicts), (1, 1));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_cancel_after_confirm_conflicts(pool: PgPool) {
        let proposal = create_proposal(&pool, new_proposal(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        confirm_proposal(&pool, proposal.id, slot("2025-03-10", "09:00"))
            .await
            .unwrap();

        match cancel_proposal(&pool, proposal.id).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Proposal is already confirmed"),
            other => panic!("expected Conflict, got {other:?}"),
        }
        assert!(matches!(
            cancel_proposal(&pool, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_confirm_rejects_unproposed_slot(pool: PgPool) {
        let proposal = create_proposal(&pool, new_proposal(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap();
        assert!(matches!(
            confirm_proposal(&pool, proposal.id, slot("2025-03-12", "09:00")).await,
            Err(AppError::Validation(_))
        ));
        let unchanged = get_proposal(&pool, proposal.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, "proposed");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_filters_by_participant_and_kind(pool: PgPool) {
        let (student, recruiter) = (Uuid::new_v4(), Uuid::new_v4());
        create_proposal(&pool, new_proposal(student, recruiter)).await.unwrap();
        let mut interview = new_proposal(student, Uuid::new_v4());
        interview.kind = MeetingKind::Interview;
        create_proposal(&pool, interview).await.unwrap();

        let by_student = ProposalFilter {
            student_id: Some(student),
            ..Default::default()
        };
        assert_eq!(list_proposals(&pool, &by_student).await.unwrap().len(), 2);

        let coffee_only = ProposalFilter {
            student_id: Some(student),
            kind: Some(MeetingKind::CoffeeChat),
            ..Default::default()
        };
        let rows = list_proposals(&pool, &coffee_only).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].recruiter_id, recruiter);
    }
}
