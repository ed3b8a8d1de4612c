use crate::features::filesystem::tree::render_folder_tree;
use crate::features::settings::read_settings_files;
use crate::shared::config::{CollectionEnvironment, ServiceProfile};
use crate::shared::error::CollectionError;
use crate::shared::models::{ArtifactKind, ArtifactRecord, ArtifactRecordBuilder};
use crate::shared::traits::{ArtifactCollector, CollectionContext};
use crate::shared::utils::{calculate_file_hash, display_name, file_times, join_relative};
use log::info;
use std::path::PathBuf;

/// Resolves `<localAppData>/<parentDirectory>/<targetDirectory>`, checking each
/// level so the error names the first missing folder.
pub fn resolve_target_directory(
    profile: &ServiceProfile,
    environment: &CollectionEnvironment,
) -> Result<PathBuf, CollectionError> {
    let parent_folder = join_relative(&environment.local_app_data, &profile.parent_directory);
    if !parent_folder.is_dir() {
        return Err(CollectionError::PathNotFound(format!(
            "{} folder",
            parent_folder.display()
        )));
    }

    let target_folder = join_relative(&parent_folder, &profile.target_directory);
    if !target_folder.is_dir() {
        return Err(CollectionError::PathNotFound(format!(
            "{} folder",
            target_folder.display()
        )));
    }

    Ok(target_folder)
}

/// Folder tree of the client's data directory plus its settings files.
pub struct AppDataCollector;

impl AppDataCollector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AppDataCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactCollector for AppDataCollector {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::AppData
    }

    fn collect(&self, ctx: &CollectionContext<'_>) -> Result<Vec<ArtifactRecord>, CollectionError> {
        let target_folder = resolve_target_directory(ctx.profile, ctx.environment)?;
        let mut records = Vec::new();

        let (created, modified) = file_times(&target_folder);
        records.push(
            ArtifactRecordBuilder::new(ArtifactKind::AppData)
                .file_name(display_name(&target_folder))
                .file_path(target_folder.display().to_string())
                .content(render_folder_tree(&target_folder))
                .created_time(created)
                .modified_time(modified)
                .build()
                .map_err(CollectionError::Parse)?,
        );

        for result in read_settings_files(&target_folder, &ctx.profile.settings_files) {
            let hash = if result.extract_flag() {
                calculate_file_hash(&join_relative(&target_folder, &result.file_name))
            } else {
                None
            };
            records.push(
                ArtifactRecordBuilder::new(ArtifactKind::AppData)
                    .file_name(result.file_name.clone())
                    .file_path(result.file_path.clone())
                    .content(result.display_content())
                    .created_time(result.created_date)
                    .modified_time(result.modified_date)
                    .sha256(hash)
                    .build()
                    .map_err(CollectionError::Parse)?,
            );
        }

        info!(
            "Collected {} appdata artifacts from {}",
            records.len(),
            target_folder.display()
        );
        Ok(records)
    }
}
