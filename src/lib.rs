pub mod aggregator;
pub mod features;
pub mod shared;

pub use aggregator::{collect, ArtifactAggregator, CollectionFailure, CollectionReport};

// Re-export commonly used items from features
pub use features::cookies::{CookieCollector, CookieEntry, DataProtection, DpapiProtection};
pub use features::filesystem::{render_folder_tree, AppDataCollector};
pub use features::logs::{read_log_content, LogCollector};
pub use features::registry::{CurrentUserRegistry, RegistryCollector, RegistrySource, RegistryValue};
pub use features::settings::{
    extract_keys,
    read_settings_files,
    ExtractionOutcome,
    ExtractionResult,
};

// Re-export shared functionality
pub use shared::config::{
    CollectionEnvironment,
    CollectorSettings,
    DetectorConfig,
    ServiceProfile,
    SettingsFileSpec,
};
pub use shared::error::{CollectionError, ConfigError, DetectorError};
pub use shared::models::{ArtifactKind, ArtifactRecord, ArtifactRecordBuilder};
pub use shared::traits::{ArtifactCollector, CollectionContext};
