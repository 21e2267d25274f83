use crate::models::{SHEET_COLUMNS, SheetHandle, SheetRow};
use crate::services::google_api::{GoogleApiError, check_response};
use crate::services::google_auth::AccessTokenProvider;
use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

#[async_trait]
pub trait SheetAppender: Send + Sync {
    /// Loads spreadsheet metadata and returns its first worksheet.
    async fn load_first_sheet(&self, spreadsheet_id: &str) -> Result<SheetHandle, GoogleApiError>;

    /// Appends `row` below the existing data of `sheet`.
    async fn append_row(&self, sheet: &SheetHandle, row: &SheetRow) -> Result<(), GoogleApiError>;
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    #[serde(default)]
    updated_range: Option<String>,
}

/// A1 notation for a whole sheet, quoting the title as Sheets requires.
pub fn sheet_range(title: &str, cells: Option<&str>) -> String {
    let quoted = format!("'{}'", title.replace('\'', "''"));
    match cells {
        Some(cells) => format!("{}!{}", quoted, cells),
        None => quoted,
    }
}

/// Orders the row's values under the sheet's header cells.
///
/// Every known column must be present in the header; extra header cells are
/// left blank.
pub fn row_values(headers: &[String], row: &SheetRow) -> Result<Vec<Value>, GoogleApiError> {
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(GoogleApiError::SchemaMismatch(
            "the header row is empty; fill the first row with column names".to_string(),
        ));
    }

    let missing: Vec<&str> = SHEET_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h.trim().eq_ignore_ascii_case(col)))
        .collect();
    if !missing.is_empty() {
        return Err(GoogleApiError::SchemaMismatch(format!(
            "missing header column(s): {}",
            missing.join(", ")
        )));
    }

    Ok(headers
        .iter()
        .map(|h| row.value_for(h).unwrap_or_else(|| Value::from("")))
        .collect())
}

pub struct GoogleSheetsClient {
    http: reqwest::Client,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(http: reqwest::Client, auth: Arc<dyn AccessTokenProvider>, base_url: &str) -> Self {
        Self {
            http,
            auth,
            base_url: format!("{}/v4/spreadsheets", base_url.trim_end_matches('/')),
        }
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.base_url,
            utf8_percent_encode(spreadsheet_id, NON_ALPHANUMERIC),
            utf8_percent_encode(range, NON_ALPHANUMERIC)
        )
    }

    async fn header_row(&self, sheet: &SheetHandle) -> Result<Vec<String>, GoogleApiError> {
        let token = self.auth.access_token().await?;
        let url = self.values_url(&sheet.spreadsheet_id, &sheet_range(&sheet.title, Some("1:1")));

        let range: ValueRange = check_response(self.http.get(url).bearer_auth(token).send().await?)
            .await?
            .json()
            .await
            .map_err(|e| GoogleApiError::Malformed(format!("header row: {}", e)))?;

        Ok(range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|cell| match cell {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }
}

#[async_trait]
impl SheetAppender for GoogleSheetsClient {
    async fn load_first_sheet(&self, spreadsheet_id: &str) -> Result<SheetHandle, GoogleApiError> {
        let token = self.auth.access_token().await?;
        let url = format!(
            "{}/{}",
            self.base_url,
            utf8_percent_encode(spreadsheet_id, NON_ALPHANUMERIC)
        );

        let response = self
            .http
            .get(url)
            .query(&[("fields", "sheets.properties(sheetId,title,index)")])
            .bearer_auth(token)
            .send()
            .await?;

        let metadata: SpreadsheetMetadata = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| GoogleApiError::Malformed(format!("spreadsheet metadata: {}", e)))?;

        let first = metadata
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .min_by_key(|p| p.index)
            .ok_or_else(|| {
                GoogleApiError::Malformed(format!("spreadsheet {} has no sheets", spreadsheet_id))
            })?;

        Ok(SheetHandle {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_id: first.sheet_id,
            title: first.title,
        })
    }

    async fn append_row(&self, sheet: &SheetHandle, row: &SheetRow) -> Result<(), GoogleApiError> {
        let headers = self.header_row(sheet).await?;
        let values = row_values(&headers, row)?;

        let token = self.auth.access_token().await?;
        let url = format!(
            "{}:append",
            self.values_url(&sheet.spreadsheet_id, &sheet_range(&sheet.title, None))
        );

        let response = self
            .http
            .post(url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(token)
            .json(&json!({
                "majorDimension": "ROWS",
                "values": [values],
            }))
            .send()
            .await?;

        let appended: AppendResponse = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| GoogleApiError::Malformed(format!("append response: {}", e)))?;

        tracing::info!(
            "Appended row for file {} to {}",
            row.file_id,
            appended
                .updates
                .and_then(|u| u.updated_range)
                .unwrap_or_else(|| sheet.title.clone())
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row() -> SheetRow {
        SheetRow {
            faculty_name: "Dr. Smith".to_string(),
            faculty_id: 42,
            title: "Policy Doc".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            file_id: "drive-1".to_string(),
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sheet_range_quotes_title() {
        assert_eq!(sheet_range("Sheet1", None), "'Sheet1'");
        assert_eq!(sheet_range("Dr's log", Some("1:1")), "'Dr''s log'!1:1");
    }

    #[test]
    fn test_row_values_follow_sheet_header_order() {
        let headers = headers(&[
            "File ID (Drive)",
            "Title",
            "Notes",
            "Faculty Name",
            "ID",
            "Issue Date",
        ]);
        let values = row_values(&headers, &row()).unwrap();
        assert_eq!(
            values,
            vec![
                Value::from("drive-1"),
                Value::from("Policy Doc"),
                Value::from(""),
                Value::from("Dr. Smith"),
                Value::from(42),
                Value::from("2024-01-15"),
            ]
        );
    }

    #[test]
    fn test_row_values_rejects_missing_column() {
        let headers = headers(&["Faculty Name", "ID", "Title", "Issue Date"]);
        let err = row_values(&headers, &row()).unwrap_err();
        assert!(matches!(err, GoogleApiError::SchemaMismatch(ref m) if m.contains("File ID (Drive)")));
    }

    #[test]
    fn test_row_values_rejects_empty_header() {
        assert!(matches!(
            row_values(&[], &row()),
            Err(GoogleApiError::SchemaMismatch(_))
        ));
    }
}
