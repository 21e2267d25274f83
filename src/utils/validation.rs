use crate::models::{TempUpload, UploadForm, UploadRequest};
use chrono::NaiveDate;
use thiserror::Error;
use validator::Validate;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    MissingField(String),

    #[error("facultyId must be a whole number, got '{0}'")]
    InvalidFacultyId(String),

    #[error("issueDate must be a date in YYYY-MM-DD form, got '{0}'")]
    InvalidIssueDate(String),

    #[error("A file is required")]
    MissingFile,
}

pub fn parse_faculty_id(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFacultyId(raw.to_string()))
}

pub fn parse_issue_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidIssueDate(raw.to_string()))
}

/// Strips any client-side directory prefix from a multipart filename.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace(char::is_control, "");

    if base.is_empty() || base == "." || base == ".." {
        "unnamed".to_string()
    } else {
        base
    }
}

/// Checks required fields and converts the raw form into an [`UploadRequest`].
pub fn build_upload_request(
    form: UploadForm,
    file: Option<TempUpload>,
) -> Result<UploadRequest, ValidationError> {
    let form = form.trimmed();
    if let Err(errors) = form.validate() {
        let mut messages: Vec<String> = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        messages.sort();
        return Err(ValidationError::MissingField(messages.join(", ")));
    }

    let faculty_id = parse_faculty_id(&form.faculty_id)?;
    let issue_date = parse_issue_date(&form.issue_date)?;
    let file = file.ok_or(ValidationError::MissingFile)?;

    Ok(UploadRequest {
        faculty_name: form.faculty_name,
        faculty_id,
        title: form.title,
        issue_date,
        file,
    })
}
