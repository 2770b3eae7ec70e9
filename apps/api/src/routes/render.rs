//! Render endpoints for sources posted directly by the client.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::Document;
use crate::pipeline::{
    build_document, download_raw_source, HeaderOverride, RawSourceDownload, RenderOutput, RenderRequest, RenderStage,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenderBody {
    pub source: String,
    #[serde(default)]
    pub is_markup: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

impl RenderBody {
    fn into_request(self) -> Result<RenderRequest, AppError> {
        if self.source.trim().is_empty() {
            return Err(AppError::Validation("source must not be empty".to_string()));
        }

        let header = HeaderOverride {
            name: self.name,
            contact: self.contact,
        };
        let request = RenderRequest::new(self.source, self.is_markup);
        if header == HeaderOverride::default() {
            Ok(request)
        } else {
            Ok(request.with_header(header))
        }
    }
}

/// POST /api/v1/render
pub async fn handle_render(State(state): State<AppState>, Json(body): Json<RenderBody>) -> Result<Response, AppError> {
    let request = body.into_request()?;
    let output = state.pipeline.produce_request(request).await;
    Ok(pdf_response(output))
}

/// POST /api/v1/render/document
/// Structured preview of what the local renderer would lay out.
pub async fn handle_render_document(Json(body): Json<RenderBody>) -> Result<Json<Document>, AppError> {
    let request = body.into_request()?;
    Ok(Json(build_document(&request.source, request.is_markup, request.header.as_ref())))
}

/// POST /api/v1/render/source
pub async fn handle_render_source(Json(body): Json<RenderBody>) -> Result<Response, AppError> {
    let request = body.into_request()?;
    download_response(download_raw_source(&request.source, request.is_markup))
}

// ────────────────────────────────────────────────────────────────────────────
// Response builders shared with the profile routes
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn pdf_response(output: RenderOutput) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"resume.pdf\""),
    );
    headers.insert("x-render-stage", HeaderValue::from_static(output.stage.as_str()));
    if let Ok(id) = HeaderValue::from_str(&output.render_id.to_string()) {
        headers.insert("x-render-id", id);
    }
    if let Some(pages) = output.page_count {
        headers.insert("x-page-count", HeaderValue::from(pages));
    }
    headers.insert("x-render-failures", HeaderValue::from(output.failures.len()));
    if let Ok(at) = HeaderValue::from_str(&output.rendered_at.to_rfc3339()) {
        headers.insert("x-rendered-at", at);
    }
    // The fallback page tells the reader to fetch the original source.
    if output.stage == RenderStage::Fallback {
        headers.insert("x-source-filename", HeaderValue::from_static(output.raw_source().filename));
    }

    (StatusCode::OK, headers, output.blob).into_response()
}

pub(crate) fn download_response(download: RawSourceDownload) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", download.filename))
        .map_err(|e| AppError::Internal(e.into()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(download.content_type));
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((StatusCode::OK, headers, download.bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(source: &str) -> RenderBody {
        RenderBody {
            source: source.to_string(),
            is_markup: false,
            name: None,
            contact: None,
        }
    }

    #[test]
    fn test_blank_source_rejected() {
        assert!(matches!(body("  \n ").into_request(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_header_only_attached_when_given() {
        let request = body("SKILLS\nRust").into_request().unwrap();
        assert!(request.header.is_none());

        let request = RenderBody {
            name: Some("Ada".to_string()),
            ..body("SKILLS\nRust")
        }
        .into_request()
        .unwrap();
        assert_eq!(request.header.and_then(|h| h.name).as_deref(), Some("Ada"));
    }
}
