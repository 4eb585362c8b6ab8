use statsheet_core::{AppError, AppResult};
use std::path::Path;

pub fn check_output(path: &Path, overwrite: bool) -> AppResult<()> {
    if path.is_dir() {
        return Err(AppError::usage(format!(
            "output path {} is a directory",
            path.display()
        )));
    }
    if path.exists() && !overwrite {
        return Err(AppError::usage(format!(
            "{} already exists; use --overwrite to replace",
            path.display()
        )));
    }
    Ok(())
}

pub fn write_output(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::internal(format!("failed to create {}: {e}", parent.display()))
        })?;
    }
    std::fs::write(path, bytes)
        .map_err(|e| AppError::internal(format!("failed to write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}
