pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{applications, chat, github, matching, personality, profiles, resume, schedule, student};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/profiles", get(profiles::handle_list_profiles))
        // Resume API
        .route(
            "/resume/process",
            post(resume::handlers::handle_process_resume),
        )
        .route(
            "/resume/student/:student_id",
            get(resume::handlers::handle_get_student_resume)
                .delete(resume::handlers::handle_delete_student_resume),
        )
        .route(
            "/resume/search",
            post(resume::handlers::handle_search_candidates),
        )
        // Candidate matching
        .route(
            "/rag/query/customrag",
            post(matching::handlers::handle_custom_rag_query),
        )
        .route(
            "/jobs/:job_id/matches",
            get(matching::handlers::handle_job_matches),
        )
        // Student API
        .route(
            "/student/feedback",
            post(student::handlers::handle_resume_feedback),
        )
        .route(
            "/student/generate-cover-letters",
            post(student::handlers::handle_generate_cover_letters),
        )
        .route(
            "/student/refine-cover-letter",
            post(student::handlers::handle_refine_cover_letter),
        )
        // Chat API
        .route("/chat", post(chat::handlers::handle_chat))
        .route(
            "/chat/community",
            post(chat::handlers::handle_community_chat),
        )
        .route(
            "/chat/chat_with_history",
            post(chat::handlers::handle_chat_with_history),
        )
        .route("/chat/twin", post(chat::handlers::handle_twin_chat))
        // GitHub portfolio
        .route(
            "/github/create",
            post(github::handlers::handle_create_portfolio),
        )
        // Personality API
        .route(
            "/personality/analyze",
            post(personality::handlers::handle_analyze_video).layer(DefaultBodyLimit::max(
                personality::handlers::MAX_UPLOAD_BODY_BYTES,
            )),
        )
        .route(
            "/personality/student/:student_id/history",
            get(personality::handlers::handle_analysis_history),
        )
        // Schedule API
        .route(
            "/schedule/parse_schedule",
            post(schedule::handlers::handle_parse_schedule),
        )
        .route(
            "/schedule/proposals",
            get(schedule::handlers::handle_list_proposals)
                .post(schedule::handlers::handle_create_proposal),
        )
        .route(
            "/schedule/proposals/:id/confirm",
            post(schedule::handlers::handle_confirm_proposal),
        )
        .route(
            "/schedule/proposals/:id/cancel",
            post(schedule::handlers::handle_cancel_proposal),
        )
        // Applications API
        .route(
            "/applications",
            post(applications::handlers::handle_create_application),
        )
        .route(
            "/applications/:id/status",
            patch(applications::handlers::handle_update_status),
        )
        .route(
            "/jobs/:job_id/applicants",
            get(applications::handlers::handle_list_applicants),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::testing::test_state;

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (status, body) = send(Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model"], "deepseek-ai/DeepSeek-V3-0324");
        assert_eq!(body["type"], "huggingface_api");

        let (status, body) = send(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_parse_schedule_endpoint() {
        let (status, body) = send(post_json(
            "/schedule/parse_schedule",
            json!({"message": "Monday and Tuesday at 9am", "current_date": "2025-03-05T12:00:00Z"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["slots"],
            json!([
                {"date": "2025-03-10", "time": "09:00"},
                {"date": "2025-03-11", "time": "09:00"}
            ])
        );
        assert!(body["ai_message"]
            .as_str()
            .unwrap()
            .starts_with("I've scheduled interview slots for Monday, March 10 at 09:00"));
    }

    #[tokio::test]
    async fn test_parse_schedule_rejects_bad_date() {
        let (status, body) = send(post_json(
            "/schedule/parse_schedule",
            json!({"message": "Monday at 9am", "current_date": "next week"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_chat_with_history_validation() {
        let (status, _) = send(post_json(
            "/chat/chat_with_history",
            json!({"messages": []}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(post_json(
            "/chat/chat_with_history",
            json!({"messages": [{"role": "robot", "content": "hi"}]}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("robot"));
    }

    #[tokio::test]
    async fn test_twin_requires_messages() {
        let (status, _) = send(post_json(
            "/chat/twin",
            json!({"student_id": "00000000-0000-0000-0000-000000000001", "messages": []}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_refine_cover_letter_requires_input() {
        let (status, _) = send(post_json(
            "/student/refine-cover-letter",
            json!({"original_letter": "  ", "instruction": "shorter"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_custom_rag_requires_query() {
        let (status, _) = send(post_json("/rag/query/customrag", json!({"query": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_proposal_validation_happens_before_storage() {
        let (status, _) = send(post_json(
            "/schedule/proposals",
            json!({
                "kind": "coffee_chat",
                "recruiter_id": "00000000-0000-0000-0000-000000000001",
                "student_id": "00000000-0000-0000-0000-000000000002",
                "slots": []
            }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            Request::get("/schedule/proposals?kind=interview")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_personality_rejects_non_video_upload() {
        let boundary = "X-RECRUIT-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"video\"; filename=\"photo.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             not a video\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::post("/personality/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Got: image/png"));
    }

    #[tokio::test]
    async fn test_personality_analysis_failure_is_reported_in_body() {
        let boundary = "X-RECRUIT-BOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"video\"; filename=\"clip.mp4\"\r\n\
             Content-Type: video/mp4\r\n\r\n\
             fake mp4 bytes\r\n\
             --{boundary}--\r\n"
        );
        let request = Request::post("/personality/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "analysis unavailable");
    }
}
