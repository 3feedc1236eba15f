use anyhow::{Context, Result};
use log::trace;
use std::path::Path;

/// Reads a text file (e.g., a `.csv` export) from `path`.
///
/// ```ignore
/// let csv: String = nepse_util::read_text("./buffer/today.csv").await?;
/// ```
pub async fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    trace!("read {} bytes from {}", text.len(), path.display());
    Ok(text)
}

/// Write `contents` to `path`.
///
/// Parent directories are created, as necessary.
pub async fn write_text(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    trace!("wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Pretty-print `data` as `.json` to `path`.
pub async fn write_json<T: serde::Serialize>(path: impl AsRef<Path>, data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    write_text(path, &json).await
}
