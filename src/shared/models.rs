use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Registry,
    AppData,
    Cookie,
    Log,
}

impl ArtifactKind {
    /// Collection order used by the aggregator.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Registry,
        ArtifactKind::AppData,
        ArtifactKind::Cookie,
        ArtifactKind::Log,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Registry => "Registry",
            ArtifactKind::AppData => "AppData",
            ArtifactKind::Cookie => "Cookie",
            ArtifactKind::Log => "Log",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: String,
    pub file_type: ArtifactKind,
    pub file_name: String,
    pub file_path: String,
    pub content: String,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub sha256: Option<String>,
}

impl ArtifactRecord {
    pub fn validate(&self) -> Result<(), String> {
        if self.file_name.is_empty() {
            return Err("Artifact file name cannot be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct ArtifactRecordBuilder {
    file_type: Option<ArtifactKind>,
    file_name: Option<String>,
    file_path: Option<String>,
    content: Option<String>,
    created_time: Option<DateTime<Utc>>,
    modified_time: Option<DateTime<Utc>>,
    sha256: Option<String>,
}

impl ArtifactRecordBuilder {
    pub fn new(file_type: ArtifactKind) -> Self {
        Self {
            file_type: Some(file_type),
            ..Self::default()
        }
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn created_time(mut self, created_time: Option<DateTime<Utc>>) -> Self {
        self.created_time = created_time;
        self
    }

    pub fn modified_time(mut self, modified_time: Option<DateTime<Utc>>) -> Self {
        self.modified_time = modified_time;
        self
    }

    pub fn sha256(mut self, sha256: Option<String>) -> Self {
        self.sha256 = sha256;
        self
    }

    pub fn build(self) -> Result<ArtifactRecord, String> {
        let record = ArtifactRecord {
            id: Uuid::new_v4().to_string(),
            file_type: self.file_type.ok_or("file_type is required")?,
            file_name: self.file_name.ok_or("file_name is required")?,
            file_path: self.file_path.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            created_time: self.created_time,
            modified_time: self.modified_time,
            sha256: self.sha256,
        };

        record.validate()?;
        Ok(record)
    }
}
