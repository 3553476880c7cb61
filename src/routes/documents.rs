use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::info;

use crate::documents::{DocumentKind, LoadedDocument};
use crate::models::{AppState, DocumentInfo};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/document", post(upload_document).get(current_document))
        .with_state(state)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidRequest(format!("Malformed upload: {}", e.body_text()))
    }
}

/// Accept one PDF or DOCX under the `file` field and make it the session's document.
async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<DocumentInfo>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("document").to_string();
        let content_type = field.content_type().map(str::to_string);
        let kind = DocumentKind::detect(content_type.as_deref(), Some(&filename)).ok_or_else(|| {
            AppError::UnsupportedMedia(format!(
                "{} ({}); upload a PDF or DOCX file",
                filename,
                content_type.as_deref().unwrap_or("unknown type")
            ))
        })?;

        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(AppError::InvalidRequest(format!("{} is empty", filename)));
        }

        info!(filename = %filename, kind = %kind, size = bytes.len(), "Document upload received");

        let document = tokio::task::spawn_blocking(move || LoadedDocument::load(filename, kind, &bytes))
            .await
            .map_err(|e| AppError::Internal(format!("extraction task failed: {}", e)))??;

        let document_info = DocumentInfo::from(&document);
        info!(
            document_id = %document_info.id,
            characters = document_info.characters,
            has_text = document_info.has_text,
            "Document successfully uploaded and processed"
        );
        state.session.replace_document(document).await;

        return Ok(Json(document_info));
    }

    Err(AppError::InvalidRequest("Missing `file` field in upload".to_string()))
}

async fn current_document(State(state): State<AppState>) -> AppResult<Json<DocumentInfo>> {
    let document = state
        .session
        .document()
        .await
        .ok_or_else(|| AppError::NotFound("No document has been uploaded".to_string()))?;
    Ok(Json(DocumentInfo::from(&document)))
}
