pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/roles", get(handlers::handle_list_roles))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_close_session),
        )
        .route(
            "/api/v1/sessions/:id/api-key",
            put(handlers::handle_set_api_key),
        )
        // Screening
        .route(
            "/api/v1/sessions/:id/analyze",
            post(handlers::handle_analyze),
        )
        .route(
            "/api/v1/sessions/:id/questions",
            post(handlers::handle_ask_question),
        )
        .route(
            "/api/v1/sessions/:id/improvements",
            post(handlers::handle_improve_resume),
        )
        .route(
            "/api/v1/sessions/:id/improved-resume",
            post(handlers::handle_improved_resume),
        )
        .route(
            "/api/v1/sessions/:id/interview-questions",
            post(handlers::handle_interview_questions),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::retrieval::fake::FakeBackend;
    use crate::screening::sessions::SessionStore;

    const BOUNDARY: &str = "screener-test-boundary";

    fn test_app(fake: &FakeBackend, scratch: &TempDir, default_key: Option<&str>) -> Router {
        let config = Config {
            default_api_key: default_key.map(str::to_string),
            llm_api_url: "http://localhost:0".to_string(),
            cutoff_score: 75,
            port: 0,
            rust_log: "info".to_string(),
            scratch_dir: scratch.path().to_path_buf(),
            skill_query_timeout: Duration::from_secs(5),
            max_upload_bytes: 1024 * 1024,
        };
        build_router(AppState {
            config,
            backend: Arc::new(fake.clone()),
            sessions: SessionStore::default(),
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn analyze_request(session_id: &str, resume: &str, role: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"resume\"; filename=\"resume.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {resume}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"role\"\r\n\r\n\
             {role}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/sessions/{session_id}/analyze"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send(
            app,
            json_request("POST", "/api/v1/sessions", json!({"api_key": "k-123"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["session_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let scratch = TempDir::new().unwrap();
        let app = test_app(&FakeBackend::replying("").build(), &scratch, None);
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["sessions"], 0);

        create_session(&app).await;
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (_, body) = send(&app, request).await;
        assert_eq!(body["sessions"], 1);
    }

    #[tokio::test]
    async fn test_roles_are_listed() {
        let scratch = TempDir::new().unwrap();
        let app = test_app(&FakeBackend::replying("").build(), &scratch, None);
        let request = Request::builder()
            .uri("/api/v1/roles")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_session_requires_api_key() {
        let scratch = TempDir::new().unwrap();
        let app = test_app(&FakeBackend::replying("").build(), &scratch, None);
        let (status, body) = send(&app, json_request("POST", "/api/v1/sessions", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_session_uses_configured_default_key() {
        let scratch = TempDir::new().unwrap();
        let fake = FakeBackend::replying("").build();
        let app = test_app(&fake, &scratch, Some("server-key"));
        let (status, _) = send(&app, json_request("POST", "/api/v1/sessions", json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(fake.api_keys(), vec!["server-key"]);
    }

    #[tokio::test]
    async fn test_question_before_analyze_is_guidance() {
        let scratch = TempDir::new().unwrap();
        let fake = FakeBackend::replying("").build();
        let app = test_app(&fake, &scratch, None);
        let id = create_session(&app).await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/questions"),
                json!({"question": "Any Go?"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], "Please analyze a resume first.");
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_then_ask() {
        let scratch = TempDir::new().unwrap();
        let fake = FakeBackend::replying("9. Expert.").build();
        let app = test_app(&fake, &scratch, None);
        let id = create_session(&app).await;

        let (status, body) = send(
            &app,
            analyze_request(&id, "5 years Python, 2 years Go", "Data Scientist"),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["overall_score"], 90);
        assert_eq!(body["selected"], true);
        assert_eq!(body["skill_scores"]["Python"], 9);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/questions"),
                json!({"question": "Strongest skill?"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "9. Expert.");
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected() {
        let scratch = TempDir::new().unwrap();
        let app = test_app(&FakeBackend::replying("9.").build(), &scratch, None);
        let id = create_session(&app).await;

        let (status, _) = send(&app, analyze_request(&id, "resume", "Astronaut")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_interview_questions_are_not_yet_available() {
        let scratch = TempDir::new().unwrap();
        let app = test_app(&FakeBackend::replying("").build(), &scratch, None);
        let id = create_session(&app).await;

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/sessions/{id}/interview-questions"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
    }

    #[tokio::test]
    async fn test_close_session_then_not_found() {
        let scratch = TempDir::new().unwrap();
        let app = test_app(&FakeBackend::replying("").build(), &scratch, None);
        let id = create_session(&app).await;
        let uri = format!("/api/v1/sessions/{id}");

        let delete = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, delete).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let get = Request::builder().uri(&uri).body(Body::empty()).unwrap();
        let (status, _) = send(&app, get).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
