use crate::api::error::AppError;
use crate::api::pages::UploadFormPage;
use askama::Template;
use axum::response::Html;

/// GET / - the static upload form.
pub async fn render_form() -> Result<Html<String>, AppError> {
    Ok(Html(UploadFormPage::default().render()?))
}
