//! OCR proxy route.

use axum::{
    Router,
    extract::{Multipart, State},
    routing::post,
};
use expensa_shared::{AppError, OcrUpload};

use crate::AppState;
use crate::response::{ApiResponse, ApiResult};

/// Creates the OCR route (gate applied by the caller).
pub fn routes() -> Router<AppState> {
    Router::new().route("/ocr", post(upload))
}

/// POST /ocr - Forward an uploaded file to the OCR service and relay its answer.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<serde_json::Value> {
    let mut file = None;
    let mut save_result = false;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                file = Some((file_name, content_type, bytes));
            }
            Some("save_result") => {
                save_result = field.text().await?.trim() == "true";
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        file.ok_or_else(|| AppError::Validation("No file uploaded".into()))?;

    tracing::debug!(file_name = %file_name, size = bytes.len(), save_result, "forwarding upload to OCR");
    let result = state
        .ocr
        .process(OcrUpload {
            file_name,
            content_type,
            bytes,
            save_result,
        })
        .await?;

    Ok(ApiResponse::ok("File uploaded successfully", result))
}
