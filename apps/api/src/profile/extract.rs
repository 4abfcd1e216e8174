//! Document-to-text collaborator.
//!
//! Extraction failures are their own error class, isolated from AI gateway
//! failures: a bad upload never aborts a match session that already holds
//! earlier extracted text.

use bytes::Bytes;

use crate::errors::AppError;

/// Extracted plain text plus the document's display name.
#[derive(Debug)]
pub struct ExtractedDocument {
    pub text: String,
    pub file_name: String,
}

/// Extracts resume text from an uploaded PDF. The parse runs on a blocking
/// worker; pdf parsing is CPU-bound.
pub async fn extract_text(file_name: String, data: Bytes) -> Result<ExtractedDocument, AppError> {
    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Extraction(
            "only PDF documents are supported".to_string(),
        ));
    }

    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| AppError::Extraction(format!("extraction task failed: {e}")))?
        .map_err(|e| AppError::Extraction(format!("could not read PDF text: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::Extraction(
            "the document contained no extractable text".to_string(),
        ));
    }

    Ok(ExtractedDocument { text, file_name })
}
