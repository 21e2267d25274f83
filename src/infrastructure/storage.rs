use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Makes sure the directory multipart files are spooled into exists.
pub async fn setup_upload_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;
    info!("📂 Temp uploads: {}", dir.display());
    Ok(())
}
