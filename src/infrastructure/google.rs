use crate::config::AppConfig;
use crate::services::drive::GoogleDriveStorage;
use crate::services::google_auth::{
    AccessTokenProvider, DRIVE_SCOPE, SHEETS_SCOPE, ServiceAccountAuth, ServiceAccountKey,
};
use crate::services::sheets::GoogleSheetsClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct GoogleClients {
    pub drive: Arc<GoogleDriveStorage>,
    pub sheets: Arc<GoogleSheetsClient>,
}

/// Loads the service-account credential and builds both API clients on one
/// shared authorization context. Any credential problem is fatal.
pub fn setup_google_clients(config: &AppConfig) -> Result<GoogleClients> {
    let key = ServiceAccountKey::from_file(&config.credentials_path)?;
    info!(
        "🔑 Service account: {} (project: {})",
        key.client_email,
        key.project_id.as_deref().unwrap_or("unknown")
    );

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(concat!("faculty-upload/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    let auth: Arc<dyn AccessTokenProvider> = Arc::new(ServiceAccountAuth::new(
        http.clone(),
        key,
        &[DRIVE_SCOPE, SHEETS_SCOPE],
    )?);

    info!(
        "☁️  Drive folder: {}, Spreadsheet: {}",
        config.drive_folder_id, config.spreadsheet_id
    );

    Ok(GoogleClients {
        drive: Arc::new(GoogleDriveStorage::new(
            http.clone(),
            auth.clone(),
            &config.drive_upload_url,
        )),
        sheets: Arc::new(GoogleSheetsClient::new(http, auth, &config.sheets_url)),
    })
}
