use crate::AppState;
use crate::api::error::AppError;
use crate::api::pages::SuccessPage;
use crate::config::AppConfig;
use crate::models::{TempUpload, UploadForm};
use crate::utils::validation::{build_upload_request, sanitize_filename};
use askama::Template;
use axum::{
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
    response::Html,
};
use tokio::io::AsyncWriteExt;

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Streams the `file` part into a fresh temp file under the upload directory.
///
/// Returns `None` when the browser sent an empty file input.
async fn spool_to_temp(
    mut field: Field<'_>,
    config: &AppConfig,
) -> Result<Option<TempUpload>, AppError> {
    let Some(raw_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string) else {
        return Ok(None);
    };
    let original_name = sanitize_filename(&raw_name);
    let mime_type = field
        .content_type()
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
        .to_string();

    let temp = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(&config.upload_dir)
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;
    let (file, path) = temp.into_parts();
    let mut out = tokio::fs::File::from_std(file);

    let mut size: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len() as u64;
        if size > config.max_file_size as u64 {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds the {} byte limit",
                config.max_file_size
            )));
        }
        out.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write temp file: {}", e)))?;
    }
    out.flush()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write temp file: {}", e)))?;

    tracing::debug!(
        "Spooled {} ({} bytes) to {}",
        original_name,
        size,
        path.display()
    );

    Ok(Some(TempUpload {
        path,
        original_name,
        mime_type,
        size,
    }))
}

/// POST /upload - forwards the file to Drive and logs it in the sheet.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, AppError> {
    let result: Result<Html<String>, AppError> = async {
        let mut form = UploadForm::default();
        let mut file: Option<TempUpload> = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "file" => {
                    if file.is_some() {
                        return Err(AppError::BadRequest(
                            "Only one file may be uploaded per request".to_string(),
                        ));
                    }
                    file = spool_to_temp(field, &state.config).await?;
                }
                "facultyName" => form.faculty_name = field.text().await.map_err(multipart_error)?,
                "facultyId" => form.faculty_id = field.text().await.map_err(multipart_error)?,
                "title" => form.title = field.text().await.map_err(multipart_error)?,
                "issueDate" => form.issue_date = field.text().await.map_err(multipart_error)?,
                _ => tracing::debug!("Ignoring unexpected form field '{}'", name),
            }
        }

        let request = build_upload_request(form, file)?;
        let receipt = state.upload_service.handle_upload(request).await?;

        let page = SuccessPage {
            file_name: &receipt.file.name,
            file_id: &receipt.file.id,
        };
        Ok(Html(page.render()?))
    }
    .await;

    if let Err(e) = &result {
        // Drain what is left so the browser sees the error page instead of a reset connection
        tracing::debug!("Upload aborted: {}. Consuming remaining stream...", e);
        while let Ok(Some(mut field)) = multipart.next_field().await {
            while let Ok(Some(_)) = field.chunk().await {}
        }
    }

    result
}
