use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::TempPath;
use validator::Validate;

pub const COLUMN_FACULTY_NAME: &str = "Faculty Name";
pub const COLUMN_FACULTY_ID: &str = "ID";
pub const COLUMN_TITLE: &str = "Title";
pub const COLUMN_ISSUE_DATE: &str = "Issue Date";
pub const COLUMN_FILE_ID: &str = "File ID (Drive)";

/// Column headers the upload log sheet is expected to carry.
pub const SHEET_COLUMNS: [&str; 5] = [
    COLUMN_FACULTY_NAME,
    COLUMN_FACULTY_ID,
    COLUMN_TITLE,
    COLUMN_ISSUE_DATE,
    COLUMN_FILE_ID,
];

/// Raw text fields as they arrive from the multipart form.
#[derive(Debug, Default, Clone, Validate)]
pub struct UploadForm {
    #[validate(length(min = 1, message = "facultyName is required"))]
    pub faculty_name: String,

    #[validate(length(min = 1, message = "facultyId is required"))]
    pub faculty_id: String,

    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "issueDate is required"))]
    pub issue_date: String,
}

impl UploadForm {
    /// Surrounding whitespace never counts as a value.
    pub fn trimmed(self) -> Self {
        Self {
            faculty_name: self.faculty_name.trim().to_string(),
            faculty_id: self.faculty_id.trim().to_string(),
            title: self.title.trim().to_string(),
            issue_date: self.issue_date.trim().to_string(),
        }
    }
}

/// A multipart file part spooled to the local upload directory.
///
/// The file is deleted when this value is dropped; [`TempUpload::remove`]
/// does the same but reports a failed removal.
#[derive(Debug)]
pub struct TempUpload {
    pub path: TempPath,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
}

impl TempUpload {
    pub fn remove(self) {
        let path = self.path.to_path_buf();
        match self.path.close() {
            Ok(()) => tracing::debug!("Removed temp upload {}", path.display()),
            Err(e) => tracing::warn!("Failed to remove temp upload {}: {}", path.display(), e),
        }
    }
}

/// One validated form submission.
#[derive(Debug)]
pub struct UploadRequest {
    pub faculty_name: String,
    pub faculty_id: i64,
    pub title: String,
    pub issue_date: NaiveDate,
    pub file: TempUpload,
}

/// Metadata for a file being created in Drive.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDriveFile {
    pub name: String,
    pub parents: Vec<String>,
    pub mime_type: String,
}

/// The Drive entry created from an upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

/// The worksheet rows are appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetHandle {
    pub spreadsheet_id: String,
    pub sheet_id: i64,
    pub title: String,
}

/// A single upload log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub faculty_name: String,
    pub faculty_id: i64,
    pub title: String,
    pub issue_date: NaiveDate,
    pub file_id: String,
}

impl SheetRow {
    /// Rows can only be built from a file Drive has already accepted.
    pub fn new(request: &UploadRequest, stored: &StoredFile) -> Self {
        Self {
            faculty_name: request.faculty_name.clone(),
            faculty_id: request.faculty_id,
            title: request.title.clone(),
            issue_date: request.issue_date,
            file_id: stored.id.clone(),
        }
    }

    /// Cell values keyed by column header, in [`SHEET_COLUMNS`] order.
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            (COLUMN_FACULTY_NAME, Value::from(self.faculty_name.as_str())),
            (COLUMN_FACULTY_ID, Value::from(self.faculty_id)),
            (COLUMN_TITLE, Value::from(self.title.as_str())),
            (
                COLUMN_ISSUE_DATE,
                Value::from(self.issue_date.format("%Y-%m-%d").to_string()),
            ),
            (COLUMN_FILE_ID, Value::from(self.file_id.as_str())),
        ]
    }

    pub fn value_for(&self, header: &str) -> Option<Value> {
        self.fields()
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(header.trim()))
            .map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> SheetRow {
        SheetRow {
            faculty_name: "Dr. Smith".to_string(),
            faculty_id: 42,
            title: "Policy Doc".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            file_id: "drive-1".to_string(),
        }
    }

    #[test]
    fn test_fields_follow_column_order() {
        let headers: Vec<&str> = row().fields().into_iter().map(|(h, _)| h).collect();
        assert_eq!(headers, SHEET_COLUMNS.to_vec());
    }

    #[test]
    fn test_value_for_matches_header_loosely() {
        let row = row();
        assert_eq!(row.value_for(" issue date "), Some(Value::from("2024-01-15")));
        assert_eq!(row.value_for("ID"), Some(Value::from(42)));
        assert_eq!(row.value_for("Notes"), None);
    }

    #[test]
    fn test_empty_form_fails_validation() {
        let form = UploadForm {
            faculty_name: "Dr. Smith".to_string(),
            ..UploadForm::default()
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("faculty_id"));
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("issue_date"));
        assert!(!fields.contains_key("faculty_name"));
    }
}
