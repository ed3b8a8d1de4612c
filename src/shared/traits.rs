use crate::shared::config::{CollectionEnvironment, CollectorSettings, ServiceProfile};
use crate::shared::error::CollectionError;
use crate::shared::models::{ArtifactKind, ArtifactRecord};

/// Everything a handler needs for one run against one service profile.
pub struct CollectionContext<'a> {
    pub profile: &'a ServiceProfile,
    pub environment: &'a CollectionEnvironment,
    pub settings: &'a CollectorSettings,
}

/// One handler per artifact kind. Handlers never panic on bad input; every
/// failure comes back as a `CollectionError`.
pub trait ArtifactCollector {
    fn kind(&self) -> ArtifactKind;

    fn collect(&self, ctx: &CollectionContext<'_>) -> Result<Vec<ArtifactRecord>, CollectionError>;

    /// Whether the profile carries the options this handler needs.
    fn is_configured(&self, _profile: &ServiceProfile) -> bool {
        true
    }
}
