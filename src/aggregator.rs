use crate::features::cookies::CookieCollector;
use crate::features::filesystem::AppDataCollector;
use crate::features::logs::LogCollector;
use crate::features::registry::RegistryCollector;
use crate::shared::config::{CollectionEnvironment, CollectorSettings, ServiceProfile};
use crate::shared::error::CollectionError;
use crate::shared::models::{ArtifactKind, ArtifactRecord};
use crate::shared::traits::{ArtifactCollector, CollectionContext};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Serialize, Serializer};

fn serialize_error<S: Serializer>(error: &CollectionError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&error.to_string())
}

/// A handler that failed as a whole. Per-item failures stay inside records.
#[derive(Debug, Serialize)]
pub struct CollectionFailure {
    pub kind: ArtifactKind,
    #[serde(serialize_with = "serialize_error")]
    pub error: CollectionError,
}

#[derive(Debug, Serialize)]
pub struct CollectionReport {
    pub service_name: String,
    pub hostname: String,
    pub username: String,
    pub collected_at: DateTime<Utc>,
    pub records: Vec<ArtifactRecord>,
    pub failures: Vec<CollectionFailure>,
}

impl CollectionReport {
    pub fn records_of(&self, kind: ArtifactKind) -> impl Iterator<Item = &ArtifactRecord> {
        self.records.iter().filter(move |r| r.file_type == kind)
    }

    pub fn failure_for(&self, kind: ArtifactKind) -> Option<&CollectionFailure> {
        self.failures.iter().find(|f| f.kind == kind)
    }
}

pub fn default_collector(kind: ArtifactKind) -> Box<dyn ArtifactCollector> {
    match kind {
        ArtifactKind::Registry => Box::new(RegistryCollector::new()),
        ArtifactKind::AppData => Box::new(AppDataCollector::new()),
        ArtifactKind::Cookie => Box::new(CookieCollector::new()),
        ArtifactKind::Log => Box::new(LogCollector::new()),
    }
}

/// Runs every artifact handler against a service profile, in
/// `ArtifactKind::ALL` order, and merges the results.
pub struct ArtifactAggregator {
    environment: CollectionEnvironment,
    settings: CollectorSettings,
    collectors: Vec<Box<dyn ArtifactCollector>>,
}

impl ArtifactAggregator {
    pub fn new(environment: CollectionEnvironment, settings: CollectorSettings) -> Self {
        Self {
            environment,
            settings,
            collectors: ArtifactKind::ALL.iter().map(|kind| default_collector(*kind)).collect(),
        }
    }

    /// Swaps the handler registered for `collector.kind()`.
    pub fn with_collector(mut self, collector: Box<dyn ArtifactCollector>) -> Self {
        let kind = collector.kind();
        match self.collectors.iter().position(|c| c.kind() == kind) {
            Some(index) => self.collectors[index] = collector,
            None => self.collectors.push(collector),
        }
        self
    }

    pub fn collect(&self, profile: &ServiceProfile) -> CollectionReport {
        info!("Analyzing {}", profile.service_name);
        let ctx = CollectionContext {
            profile,
            environment: &self.environment,
            settings: &self.settings,
        };

        let mut records = Vec::new();
        let mut failures = Vec::new();

        for collector in &self.collectors {
            let kind = collector.kind();
            if !collector.is_configured(profile) {
                debug!("Skipping {} collection: not configured for {}", kind, profile.service_name);
                continue;
            }

            match collector.collect(&ctx) {
                Ok(collected) => {
                    info!("- {} {} artifacts", collected.len(), kind);
                    records.extend(collected);
                }
                Err(error) => {
                    warn!("Error collecting {} artifacts: {}", kind, error);
                    failures.push(CollectionFailure { kind, error });
                }
            }
        }

        CollectionReport {
            service_name: profile.service_name.clone(),
            hostname: whoami::hostname(),
            username: whoami::username(),
            collected_at: Utc::now(),
            records,
            failures,
        }
    }
}

/// Collects with the platform handlers and returns only the records.
pub fn collect(
    profile: &ServiceProfile,
    environment: &CollectionEnvironment,
    settings: &CollectorSettings,
) -> Vec<ArtifactRecord> {
    ArtifactAggregator::new(environment.clone(), settings.clone())
        .collect(profile)
        .records
}
