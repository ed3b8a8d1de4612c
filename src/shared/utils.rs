use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Joins a profile-relative path onto `base`, accepting either separator so
/// profiles written with Windows paths still resolve everywhere.
pub fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative
        .split(|c: char| c == '\\' || c == '/')
        .filter(|part| !part.is_empty() && *part != ".")
        .fold(base.to_path_buf(), |path, part| path.join(part))
}

/// Created and modified times from file metadata. Either may be missing on
/// filesystems that do not track it.
pub fn file_times(path: &Path) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match fs::metadata(path) {
        Ok(metadata) => (
            metadata.created().ok().map(DateTime::<Utc>::from),
            metadata.modified().ok().map(DateTime::<Utc>::from),
        ),
        Err(_) => (None, None),
    }
}

pub fn calculate_file_hash(path: &Path) -> Option<String> {
    if let Ok(mut file) = fs::File::open(path) {
        let mut hasher = Sha256::new();
        if std::io::copy(&mut file, &mut hasher).is_ok() {
            let hash = hasher.finalize();
            return Some(format!("{:x}", hash));
        }
    }
    None
}

pub fn format_timestamp(time: Option<&DateTime<Utc>>) -> String {
    time.map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
