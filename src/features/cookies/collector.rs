use crate::features::cookies::crypto::{decrypt_cookie_value, derive_encryption_key};
use crate::features::cookies::models::CookieEntry;
use crate::features::cookies::protection::{DataProtection, DpapiProtection};
use crate::features::filesystem::resolve_target_directory;
use crate::shared::config::ServiceProfile;
use crate::shared::error::CollectionError;
use crate::shared::models::{ArtifactKind, ArtifactRecord, ArtifactRecordBuilder};
use crate::shared::traits::{ArtifactCollector, CollectionContext};
use crate::shared::utils::{calculate_file_hash, file_times, join_relative};
use log::{debug, info, warn};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

pub const COOKIE_DB_NAME: &str = "Cookies";

fn sqlite_uri(path: &Path) -> String {
    let escaped = path
        .display()
        .to_string()
        .replace('%', "%25")
        .replace('?', "%3f")
        .replace('#', "%23");
    format!("file:{escaped}?immutable=1")
}

/// Reads every cookie row and decrypts its value. A row that cannot be
/// decrypted keeps `value: None`; only database-level failures are errors.
pub fn parse_cookie_file(
    db_path: &Path,
    key: Option<&[u8]>,
    protection: &dyn DataProtection,
) -> Result<Vec<CookieEntry>, CollectionError> {
    // Immutable open bypasses the lock held by a running client
    let conn = Connection::open_with_flags(
        sqlite_uri(db_path),
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
    )?;

    let mut stmt = conn.prepare("SELECT host_key, name, value, encrypted_value FROM cookies")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>("host_key")?,
            row.get::<_, String>("name")?,
            row.get::<_, Option<String>>("value")?,
            row.get::<_, Option<Vec<u8>>>("encrypted_value")?,
        ))
    })?;

    let mut cookies = Vec::new();
    for row in rows {
        let (host_key, name, plain_value, encrypted_value) = row?;
        let value = match encrypted_value.filter(|blob| !blob.is_empty()) {
            None => plain_value,
            Some(blob) => match decrypt_cookie_value(&blob, &host_key, key, protection) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Failed to decrypt cookie {} for {}: {}", name, host_key, e);
                    None
                }
            },
        };
        cookies.push(CookieEntry { host_key, name, value });
    }

    Ok(cookies)
}

pub struct CookieCollector {
    protection: Box<dyn DataProtection>,
}

impl CookieCollector {
    pub fn new() -> Self {
        Self::with_protection(Box::new(DpapiProtection))
    }

    pub fn with_protection(protection: Box<dyn DataProtection>) -> Self {
        Self { protection }
    }

    fn local_state_path(ctx: &CollectionContext<'_>, target_folder: &Path) -> PathBuf {
        match &ctx.profile.local_state_path {
            Some(relative) => join_relative(target_folder, relative),
            None => join_relative(
                &ctx.environment.user_profile,
                r"AppData\Local\Google\Chrome\User Data\Local State",
            ),
        }
    }
}

impl Default for CookieCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactCollector for CookieCollector {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Cookie
    }

    fn is_configured(&self, profile: &ServiceProfile) -> bool {
        profile.cookie_path.is_some()
    }

    fn collect(&self, ctx: &CollectionContext<'_>) -> Result<Vec<ArtifactRecord>, CollectionError> {
        let cookie_path = ctx.profile.cookie_path.as_deref().unwrap_or_default();
        let target_folder = resolve_target_directory(ctx.profile, ctx.environment)?;
        let db_path = join_relative(&target_folder, cookie_path).join(COOKIE_DB_NAME);
        if !db_path.is_file() {
            return Err(CollectionError::PathNotFound(db_path.display().to_string()));
        }

        let local_state = Self::local_state_path(ctx, &target_folder);
        let key = match derive_encryption_key(&local_state, self.protection.as_ref()) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(
                    "No cookie key from {}: {}; trying native unprotection only",
                    local_state.display(),
                    e
                );
                None
            }
        };

        let cookies = parse_cookie_file(&db_path, key.as_deref(), self.protection.as_ref())?;
        let decrypted = cookies.iter().filter(|c| c.value.is_some()).count();
        info!(
            "Decrypted {}/{} cookies from {}",
            decrypted,
            cookies.len(),
            db_path.display()
        );

        let (created, modified) = file_times(&db_path);
        let record = ArtifactRecordBuilder::new(ArtifactKind::Cookie)
            .file_name(COOKIE_DB_NAME)
            .file_path(db_path.display().to_string())
            .content(serde_json::to_string_pretty(&cookies)?)
            .created_time(created)
            .modified_time(modified)
            .sha256(calculate_file_hash(&db_path))
            .build()
            .map_err(CollectionError::Parse)?;

        Ok(vec![record])
    }
}
