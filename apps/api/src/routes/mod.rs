pub mod health;
pub mod profiles;
pub mod render;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Direct render API
        .route("/api/v1/render", post(render::handle_render))
        .route("/api/v1/render/document", post(render::handle_render_document))
        .route("/api/v1/render/source", post(render::handle_render_source))
        // Profile-backed render API
        .route("/api/v1/profiles/:user_id/resume", get(profiles::handle_profile_resume))
        .route(
            "/api/v1/profiles/:user_id/resume/source",
            get(profiles::handle_profile_resume_source),
        )
        .route(
            "/api/v1/profiles/:user_id/resume/generate",
            post(profiles::handle_generate_resume),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::errors::AppError;
    use crate::generation::ResumeGenerator;
    use crate::models::Profile;
    use crate::pipeline::{ExternalServiceError, RenderPipeline, RenderSettings};
    use crate::profiles::ProfileStore;

    const MARKUP: &str = r"\begin{document}
\section{Experience}
  \resumeSubheading{Engineer}{2020–2022}{Acme}{Remote}
  \resumeItem{Led X}
\end{document}";

    struct FakeStore(HashMap<Uuid, Profile>);

    #[async_trait]
    impl ProfileStore for FakeStore {
        async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
            Ok(self.0.get(&user_id).cloned())
        }
    }

    struct FakeGenerator(Result<String, u16>);

    #[async_trait]
    impl ResumeGenerator for FakeGenerator {
        async fn generate(&self, _job_description: &str, _profile: &Profile) -> Result<String, ExternalServiceError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ExternalServiceError::Status {
                    status: *status,
                    message: "overloaded".to_string(),
                }),
            }
        }
    }

    fn base_state() -> AppState {
        AppState::new(RenderPipeline::new(RenderSettings::default()))
    }

    fn state_with_profile(user_id: Uuid, raw_resume_text: &str) -> AppState {
        let profile = Profile {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555-0100".to_string(),
            raw_resume_text: raw_resume_text.to_string(),
        };
        base_state().with_profiles(Arc::new(FakeStore(HashMap::from([(user_id, profile)]))))
    }

    async fn send(state: AppState, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        build_router(state).oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    fn header_str<'a>(response: &'a Response, name: &str) -> &'a str {
        response.headers().get(name).unwrap().to_str().unwrap()
    }

    // ── Direct render ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let response = send(base_state(), Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["remote_compile"], false);
        assert_eq!(body["profile_store"], false);
    }

    #[tokio::test]
    async fn test_render_plain_text_returns_pdf() {
        let response = send(
            base_state(),
            Method::POST,
            "/api/v1/render",
            Some(json!({ "source": "SKILLS\nRust, Go", "is_markup": false, "name": "Ada" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "content-type"), "application/pdf");
        assert_eq!(header_str(&response, "x-render-stage"), "local");
        assert_eq!(header_str(&response, "x-page-count"), "1");
        assert!(Uuid::parse_str(header_str(&response, "x-render-id")).is_ok());
        assert!(header_str(&response, "content-disposition").contains("resume.pdf"));
        assert!(body_bytes(response).await.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_render_markup_without_remote_renders_locally() {
        let response = send(
            base_state(),
            Method::POST,
            "/api/v1/render",
            Some(json!({ "source": MARKUP, "is_markup": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "x-render-stage"), "local");
    }

    #[tokio::test]
    async fn test_render_empty_source_is_400() {
        let response = send(base_state(), Method::POST, "/api/v1/render", Some(json!({ "source": "   " }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_render_document_preview() {
        let response = send(
            base_state(),
            Method::POST,
            "/api/v1/render/document",
            Some(json!({ "source": MARKUP, "is_markup": true, "name": "Ada Lovelace" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let doc: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(doc["name"], "Ada Lovelace");
        assert_eq!(doc["sections"][0]["title"], "Experience");
        assert_eq!(doc["sections"][0]["items"][0]["type"], "subheading");
        assert_eq!(doc["sections"][0]["items"][1]["text"], "Led X");
    }

    #[tokio::test]
    async fn test_render_document_survives_argument_spanning_header() {
        let source = r"\begin{document}\resumeItem{\begin{center}} \textbf{x}\end{center}\section{A}\end{document}";
        let response = send(
            base_state(),
            Method::POST,
            "/api/v1/render/document",
            Some(json!({ "source": source, "is_markup": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let doc: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(doc["sections"][1]["title"], "A");
    }

    #[tokio::test]
    async fn test_render_source_passes_bytes_through() {
        let response = send(
            base_state(),
            Method::POST,
            "/api/v1/render/source",
            Some(json!({ "source": MARKUP, "is_markup": true })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "content-type"), "application/x-latex");
        assert!(header_str(&response, "content-disposition").contains("resume.tex"));
        assert_eq!(body_bytes(response).await, MARKUP.as_bytes());
    }

    // ── Profile-backed render ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_profile_routes_without_store_are_501() {
        let uri = format!("/api/v1/profiles/{}/resume", Uuid::new_v4());
        let response = send(base_state(), Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_unknown_profile_is_404() {
        let state = state_with_profile(Uuid::new_v4(), "SKILLS\nRust");
        let uri = format!("/api/v1/profiles/{}/resume", Uuid::new_v4());
        let response = send(state, Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_with_empty_resume_is_404() {
        let user_id = Uuid::new_v4();
        let uri = format!("/api/v1/profiles/{user_id}/resume");
        let response = send(state_with_profile(user_id, "  "), Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_resume_renders_pdf() {
        let user_id = Uuid::new_v4();
        let uri = format!("/api/v1/profiles/{user_id}/resume");
        let response = send(state_with_profile(user_id, "SKILLS\nRust, Go"), Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "x-render-stage"), "local");
        assert!(body_bytes(response).await.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_profile_resume_source_detects_markup() {
        let user_id = Uuid::new_v4();
        let uri = format!("/api/v1/profiles/{user_id}/resume/source");
        let response = send(state_with_profile(user_id, MARKUP), Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "content-type"), "application/x-latex");
        assert_eq!(body_bytes(response).await, MARKUP.as_bytes());
    }

    #[tokio::test]
    async fn test_profile_resume_source_is_byte_identical() {
        let user_id = Uuid::new_v4();
        let stored = "\n\\section{Skills}\n\\resumeItem{Rust}\n";
        let uri = format!("/api/v1/profiles/{user_id}/resume/source");
        let response = send(state_with_profile(user_id, stored), Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "content-type"), "application/x-latex");
        assert_eq!(body_bytes(response).await, stored.as_bytes());
    }

    // ── Generation ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_generate_without_generator_is_501() {
        let user_id = Uuid::new_v4();
        let uri = format!("/api/v1/profiles/{user_id}/resume/generate");
        let response = send(
            state_with_profile(user_id, "SKILLS\nRust"),
            Method::POST,
            &uri,
            Some(json!({ "job_description": "Rust engineer" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_generate_renders_sanitized_output() {
        let user_id = Uuid::new_v4();
        let raw = format!("Sure! Here it is:\n```latex\n{MARKUP}\n```");
        let state = state_with_profile(user_id, "").with_generator(Arc::new(FakeGenerator(Ok(raw))));
        let uri = format!("/api/v1/profiles/{user_id}/resume/generate");
        let response = send(state, Method::POST, &uri, Some(json!({ "job_description": "Rust engineer" }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_str(&response, "content-type"), "application/pdf");
        assert!(body_bytes(response).await.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_generate_blank_job_description_is_400() {
        let user_id = Uuid::new_v4();
        let state = state_with_profile(user_id, "").with_generator(Arc::new(FakeGenerator(Ok("SKILLS".into()))));
        let uri = format!("/api/v1/profiles/{user_id}/resume/generate");
        let response = send(state, Method::POST, &uri, Some(json!({ "job_description": " " }))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generator_failure_is_502() {
        let user_id = Uuid::new_v4();
        let state = state_with_profile(user_id, "").with_generator(Arc::new(FakeGenerator(Err(529))));
        let uri = format!("/api/v1/profiles/{user_id}/resume/generate");
        let response = send(state, Method::POST, &uri, Some(json!({ "job_description": "Rust engineer" }))).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
