use std::env;
use std::path::PathBuf;

/// Drive folder that receives every uploaded document.
pub const DEFAULT_DRIVE_FOLDER_ID: &str = "1pajSmFYSjnMlvtRLur2M14WHjBOLv9Jt";

/// Spreadsheet whose first worksheet logs the uploads.
pub const DEFAULT_SPREADSHEET_ID: &str = "1FvJ81y3-k9KLP4-QJUNgOVKUdD-RcNUAMW9us7zv9-E";

pub const DEFAULT_DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com";

/// Runtime configuration for the upload portal
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listening port (default: 3000)
    pub port: u16,

    /// Path to the service-account key file (default: "credentials.json")
    pub credentials_path: PathBuf,

    /// Destination Drive folder id
    pub drive_folder_id: String,

    /// Target spreadsheet id
    pub spreadsheet_id: String,

    /// Directory for transient multipart files (default: "uploads")
    pub upload_dir: PathBuf,

    /// Maximum file size in bytes (default: 256 MB)
    pub max_file_size: usize,

    /// Base URL of the Drive upload endpoint
    pub drive_upload_url: String,

    /// Base URL of the Sheets API
    pub sheets_url: String,

    /// Connect timeout for Google API calls in seconds (default: 10)
    pub connect_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            credentials_path: PathBuf::from("credentials.json"),
            drive_folder_id: DEFAULT_DRIVE_FOLDER_ID.to_string(),
            spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_string(),
            upload_dir: PathBuf::from("uploads"),
            max_file_size: 256 * 1024 * 1024, // 256 MB
            drive_upload_url: DEFAULT_DRIVE_UPLOAD_URL.to_string(),
            sheets_url: DEFAULT_SHEETS_URL.to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            credentials_path: env::var("GOOGLE_APPLICATION_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or(default.credentials_path),

            drive_folder_id: env::var("DRIVE_FOLDER_ID").unwrap_or(default.drive_folder_id),

            spreadsheet_id: env::var("SPREADSHEET_ID").unwrap_or(default.spreadsheet_id),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            drive_upload_url: env::var("GOOGLE_DRIVE_UPLOAD_URL")
                .unwrap_or(default.drive_upload_url),

            sheets_url: env::var("GOOGLE_SHEETS_URL").unwrap_or(default.sheets_url),

            connect_timeout_secs: env::var("GOOGLE_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.connect_timeout_secs),
        }
    }

    /// Body limit for `/upload`, leaving room for multipart framing and the text fields
    pub fn upload_body_limit(&self) -> usize {
        self.max_file_size + 1024 * 1024
    }
}
