use crate::features::filesystem::resolve_target_directory;
use crate::features::logs::reader::read_log_content;
use crate::shared::error::CollectionError;
use crate::shared::models::{ArtifactKind, ArtifactRecord, ArtifactRecordBuilder};
use crate::shared::traits::{ArtifactCollector, CollectionContext};
use crate::shared::utils::{calculate_file_hash, display_name, file_times};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct LogCollector;

impl LogCollector {
    pub fn new() -> Self {
        Self
    }

    fn should_collect(path: &Path, extensions: &[String]) -> bool {
        if let Some(extension) = path.extension() {
            if let Some(ext_str) = extension.to_str() {
                let ext = format!(".{}", ext_str);
                return extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext));
            }
        }
        false
    }

    fn find_log_files(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| Self::should_collect(path, extensions))
            .collect()
    }
}

impl Default for LogCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactCollector for LogCollector {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Log
    }

    fn collect(&self, ctx: &CollectionContext<'_>) -> Result<Vec<ArtifactRecord>, CollectionError> {
        let target_folder = resolve_target_directory(ctx.profile, ctx.environment)?;
        let extensions = ctx
            .profile
            .log_extensions
            .as_deref()
            .unwrap_or(ctx.settings.log_extensions.as_slice());

        let mut records = Vec::new();
        for path in Self::find_log_files(&target_folder, extensions) {
            let content = match read_log_content(&path, ctx.settings.max_log_size) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read log {}: {}", path.display(), e);
                    format!("Error reading file: {}", e)
                }
            };
            let (created, modified) = file_times(&path);
            records.push(
                ArtifactRecordBuilder::new(ArtifactKind::Log)
                    .file_name(display_name(&path))
                    .file_path(path.display().to_string())
                    .content(content)
                    .created_time(created)
                    .modified_time(modified)
                    .sha256(calculate_file_hash(&path))
                    .build()
                    .map_err(CollectionError::Parse)?,
            );
        }

        info!("Collected {} log files from {}", records.len(), target_folder.display());
        Ok(records)
    }
}
