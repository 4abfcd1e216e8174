//! Axum route handlers for the profile API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::profile::extract::extract_text;
use crate::profile::ProfileDraft;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EditProfileRequest {
    pub resume_text: Option<String>,
    pub expectations: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub file_name: String,
    pub extracted_chars: usize,
    pub profile: ProfileDraft,
}

/// GET /api/v1/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<ProfileDraft> {
    Json(state.profile.get().await)
}

/// PUT /api/v1/profile
///
/// Partial edit of resume text and/or expectations.
pub async fn handle_edit_profile(
    State(state): State<AppState>,
    Json(request): Json<EditProfileRequest>,
) -> Result<Json<ProfileDraft>, AppError> {
    if request.resume_text.is_none() && request.expectations.is_none() {
        return Err(AppError::Validation(
            "provide resume_text and/or expectations".to_string(),
        ));
    }
    let draft = state
        .profile
        .edit(request.resume_text, request.expectations)
        .await;
    Ok(Json(draft))
}

/// POST /api/v1/profile/import
///
/// Multipart upload of a PDF resume; replaces the draft resume text with
/// the extracted plain text.
pub async fn handle_import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("upload is missing a file name".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;

        let document = extract_text(file_name, data).await?;
        let extracted_chars = document.text.chars().count();
        let profile = state
            .profile
            .import(document.text, document.file_name.clone())
            .await;

        return Ok(Json(ImportResponse {
            file_name: document.file_name,
            extracted_chars,
            profile,
        }));
    }

    Err(AppError::Validation(
        "multipart upload had no `file` field".to_string(),
    ))
}
