use crate::features::registry::models::RegistryValue;
use crate::shared::config::ServiceProfile;
use crate::shared::error::CollectionError;
use crate::shared::models::{ArtifactKind, ArtifactRecord, ArtifactRecordBuilder};
use crate::shared::traits::{ArtifactCollector, CollectionContext};
use log::info;

pub const CURRENT_USER_HIVE: &str = "HKEY_CURRENT_USER";

/// Read access to one registry hive.
pub trait RegistrySource {
    /// First enumerated value under `key_path`, plus the key's last write time.
    fn read_first_value(&self, key_path: &str) -> Result<RegistryValue, CollectionError>;
}

/// HKEY_CURRENT_USER of the running user.
pub struct CurrentUserRegistry;

#[cfg(windows)]
impl RegistrySource for CurrentUserRegistry {
    fn read_first_value(&self, key_path: &str) -> Result<RegistryValue, CollectionError> {
        crate::features::registry::win32::read_first_value(key_path)
    }
}

#[cfg(not(windows))]
impl RegistrySource for CurrentUserRegistry {
    fn read_first_value(&self, _key_path: &str) -> Result<RegistryValue, CollectionError> {
        Err(CollectionError::UnsupportedPlatform("registry access"))
    }
}

pub struct RegistryCollector {
    source: Box<dyn RegistrySource>,
}

impl RegistryCollector {
    pub fn new() -> Self {
        Self::with_source(Box::new(CurrentUserRegistry))
    }

    pub fn with_source(source: Box<dyn RegistrySource>) -> Self {
        Self { source }
    }
}

impl Default for RegistryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactCollector for RegistryCollector {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Registry
    }

    fn is_configured(&self, profile: &ServiceProfile) -> bool {
        !profile.registry_path.trim().is_empty()
    }

    fn collect(&self, ctx: &CollectionContext<'_>) -> Result<Vec<ArtifactRecord>, CollectionError> {
        let key_path = ctx.profile.registry_path.trim_matches('\\');
        let value = self.source.read_first_value(key_path)?;
        info!("Read registry value {} under {}", value.display_name(), key_path);

        let record = ArtifactRecordBuilder::new(ArtifactKind::Registry)
            .file_name(value.display_name())
            .file_path(format!("{}\\{}", CURRENT_USER_HIVE, key_path))
            .content(serde_json::to_string_pretty(&value)?)
            .modified_time(value.last_write_time)
            .build()
            .map_err(CollectionError::Parse)?;

        Ok(vec![record])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::registry::models::REG_SZ;
    use crate::shared::config::{builtin_profiles, CollectionEnvironment, CollectorSettings};
    use serde_json::{json, Value};

    struct FakeRegistry;

    impl RegistrySource for FakeRegistry {
        fn read_first_value(&self, key_path: &str) -> Result<RegistryValue, CollectionError> {
            if key_path.ends_with("Amazon WorkSpaces") {
                Ok(RegistryValue {
                    name: "InstallPath".to_string(),
                    data: json!(r"C:\Program Files\Amazon Web Services, Inc\Amazon WorkSpaces"),
                    value_type: REG_SZ,
                    last_write_time: None,
                })
            } else {
                Err(CollectionError::PathNotFound(key_path.to_string()))
            }
        }
    }

    fn run(profile_index: usize) -> Result<Vec<ArtifactRecord>, CollectionError> {
        let profiles = builtin_profiles();
        let env = CollectionEnvironment::new("unused", "unused");
        let settings = CollectorSettings::default();
        let ctx = CollectionContext {
            profile: &profiles[profile_index],
            environment: &env,
            settings: &settings,
        };
        RegistryCollector::with_source(Box::new(FakeRegistry)).collect(&ctx)
    }

    #[test]
    fn value_becomes_one_record() {
        let records = run(0).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "InstallPath");
        assert_eq!(
            records[0].file_path,
            r"HKEY_CURRENT_USER\Software\Amazon Web Services, LLC\Amazon WorkSpaces"
        );
        let content: Value = serde_json::from_str(&records[0].content).unwrap();
        assert_eq!(content["type"], json!(1));
    }

    #[test]
    fn missing_key_is_path_not_found() {
        let err = run(1).unwrap_err();
        assert!(matches!(err, CollectionError::PathNotFound(_)));
        assert_eq!(err.to_string(), r"Software\Citrix\Receiver not found");
    }

    #[cfg(not(windows))]
    #[test]
    fn live_registry_is_unsupported_off_windows() {
        assert!(matches!(
            CurrentUserRegistry.read_first_value("Software"),
            Err(CollectionError::UnsupportedPlatform(_))
        ));
    }
}
