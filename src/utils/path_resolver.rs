use anyhow::Result;
use std::path::PathBuf;

const APP_DIR: &str = "site-entry-wizard";

/// Default config file: `<config_dir>/site-entry-wizard/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Folder for local data (reference list, records) when config paths are relative.
pub fn resolve_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Resolve a configured path: absolute paths are kept, relative ones land under the data folder.
pub fn resolve_data_path(configured: &str) -> PathBuf {
    let p = PathBuf::from(configured);
    if p.is_absolute() {
        p
    } else {
        resolve_data_folder().join(p)
    }
}

/// Resolve log folder (absolute path), creating it if needed.
pub fn resolve_log_folder(configured: Option<&str>) -> Result<PathBuf> {
    let log_dir = match configured.map(str::trim).filter(|s| !s.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => resolve_data_folder().join("logs"),
    };
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder {:?}: {}", log_dir, e))?;
    Ok(log_dir)
}
