//! Detection record files

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use formcheck_core::Detection;

/// `*.json` files in a folder, sorted by name
pub fn list_records(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read folder {}", dir.display()))?;

    let mut records = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            records.push(path);
        }
    }

    records.sort();
    Ok(records)
}

pub fn read_detection(path: &Path) -> Result<Detection> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse detection record {}", path.display()))
}

/// File name for reports, falling back to the full path
pub fn record_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
