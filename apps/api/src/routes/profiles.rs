//! Render endpoints backed by the profile store.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::sanitize_generated;
use crate::markup::looks_like_markup;
use crate::models::Profile;
use crate::pipeline::{download_raw_source, ExternalServiceError, RenderRequest};
use crate::profiles::{profile_header, ProfileStore};
use crate::routes::render::{download_response, pdf_response};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateBody {
    pub job_description: String,
}

fn profile_store(state: &AppState) -> Result<Arc<dyn ProfileStore>, AppError> {
    state
        .profiles
        .clone()
        .ok_or_else(|| AppError::NotImplemented("profile store is not configured".to_string()))
}

async fn load_profile(state: &AppState, user_id: Uuid) -> Result<Profile, AppError> {
    profile_store(state)?
        .get_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {user_id} not found")))
}

/// Stored résumé text as a render request. Plain text gets the profile's header.
fn stored_resume_request(profile: &Profile) -> Result<RenderRequest, AppError> {
    if profile.raw_resume_text.trim().is_empty() {
        return Err(AppError::NotFound("Profile has no stored resume".to_string()));
    }

    let is_markup = looks_like_markup(&profile.raw_resume_text);
    let request = RenderRequest::new(profile.raw_resume_text.clone(), is_markup);
    Ok(if is_markup {
        request
    } else {
        request.with_header(profile_header(profile))
    })
}

/// GET /api/v1/profiles/:user_id/resume
pub async fn handle_profile_resume(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let profile = load_profile(&state, user_id).await?;
    let request = stored_resume_request(&profile)?;
    Ok(pdf_response(state.pipeline.produce_request(request).await))
}

/// GET /api/v1/profiles/:user_id/resume/source
pub async fn handle_profile_resume_source(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let profile = load_profile(&state, user_id).await?;
    let request = stored_resume_request(&profile)?;
    download_response(download_raw_source(&request.source, request.is_markup))
}

/// POST /api/v1/profiles/:user_id/resume/generate
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<GenerateBody>,
) -> Result<Response, AppError> {
    if body.job_description.trim().is_empty() {
        return Err(AppError::Validation("job_description must not be empty".to_string()));
    }
    let generator = state
        .generator
        .clone()
        .ok_or_else(|| AppError::NotImplemented("resume generator is not configured".to_string()))?;

    let profile = load_profile(&state, user_id).await?;
    let raw = generator.generate(&body.job_description, &profile).await?;
    let generated = sanitize_generated(&raw);
    if generated.text.trim().is_empty() {
        return Err(ExternalServiceError::InvalidBody("generator returned no resume text".to_string()).into());
    }

    info!(
        user_id = %user_id,
        is_markup = generated.is_markup,
        bytes = generated.text.len(),
        "Generated resume source"
    );

    let output = if generated.is_markup {
        state.pipeline.produce(&generated.text, true).await
    } else {
        let request = RenderRequest::new(generated.text, false).with_header(profile_header(&profile));
        state.pipeline.produce_request(request).await
    };
    Ok(pdf_response(output))
}
