use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::models::{NewDriveFile, SheetHandle, SheetRow, StoredFile, UploadRequest};
use crate::services::drive::DriveStorage;
use crate::services::google_api::GoogleApiError;
use crate::services::sheets::SheetAppender;
use std::sync::Arc;
use tracing::{error, info};

/// Outcome of a fully forwarded upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub file: StoredFile,
    pub sheet: SheetHandle,
    pub row: SheetRow,
}

pub struct UploadService {
    storage: Arc<dyn DriveStorage>,
    sheets: Arc<dyn SheetAppender>,
    drive_folder_id: String,
    spreadsheet_id: String,
}

impl UploadService {
    pub fn new(
        storage: Arc<dyn DriveStorage>,
        sheets: Arc<dyn SheetAppender>,
        config: &AppConfig,
    ) -> Self {
        Self {
            storage,
            sheets,
            drive_folder_id: config.drive_folder_id.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
        }
    }

    /// Stores the file in Drive, then appends its log row.
    ///
    /// The local temp file is removed whatever the outcome. A failed append
    /// leaves the Drive file in place; its id is logged and carried in
    /// [`AppError::Append`].
    pub async fn handle_upload(&self, request: UploadRequest) -> Result<UploadReceipt, AppError> {
        let result = self.forward(&request).await;
        request.file.remove();
        result
    }

    async fn forward(&self, request: &UploadRequest) -> Result<UploadReceipt, AppError> {
        let metadata = NewDriveFile {
            name: request.file.original_name.clone(),
            parents: vec![self.drive_folder_id.clone()],
            mime_type: request.file.mime_type.clone(),
        };

        let stored = self
            .storage
            .create_file(&metadata, &request.file.path)
            .await
            .map_err(AppError::Storage)?;
        info!("📁 Stored {} in Drive as {}", metadata.name, stored.id);

        let row = SheetRow::new(request, &stored);

        match self.append(&row).await {
            Ok(sheet) => {
                info!("📝 Logged {} in sheet '{}'", stored.id, sheet.title);
                Ok(UploadReceipt {
                    file: stored,
                    sheet,
                    row,
                })
            }
            Err(source) => {
                error!(
                    file_id = %stored.id,
                    "Drive file {} is orphaned: sheet append failed: {}",
                    stored.id,
                    source
                );
                Err(AppError::Append {
                    file_id: stored.id,
                    source,
                })
            }
        }
    }

    async fn append(&self, row: &SheetRow) -> Result<SheetHandle, GoogleApiError> {
        let sheet = self.sheets.load_first_sheet(&self.spreadsheet_id).await?;
        self.sheets.append_row(&sheet, row).await?;
        Ok(sheet)
    }
}
