use chrono::{DateTime, Utc};
use crate::shared::error::CollectionError;

pub const NO_MATCHING_KEYS: &str = "No matching keys found";

#[derive(Debug)]
pub enum ExtractionOutcome {
    /// Pretty-printed JSON restricted to the requested keys.
    Extracted(String),
    NoMatchingKeys,
    Missing,
    Failed(CollectionError),
}

#[derive(Debug)]
pub struct ExtractionResult {
    pub file_name: String,
    pub file_path: String,
    pub outcome: ExtractionOutcome,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_date: Option<DateTime<Utc>>,
}

impl ExtractionResult {
    pub fn extract_flag(&self) -> bool {
        matches!(self.outcome, ExtractionOutcome::Extracted(_))
    }

    pub fn error_flag(&self) -> bool {
        !self.extract_flag()
    }

    pub fn content(&self) -> &str {
        match &self.outcome {
            ExtractionOutcome::Extracted(content) => content,
            _ => "",
        }
    }

    pub fn error_msg(&self) -> String {
        match &self.outcome {
            ExtractionOutcome::Extracted(_) => String::new(),
            ExtractionOutcome::NoMatchingKeys => NO_MATCHING_KEYS.to_string(),
            ExtractionOutcome::Missing => format!("File does not exist: {}", self.file_path),
            ExtractionOutcome::Failed(e) => format!("Error reading file: {}", e),
        }
    }

    /// Text shown in the artifact table: the extracted JSON, or the error.
    pub fn display_content(&self) -> String {
        if self.extract_flag() {
            self.content().to_string()
        } else {
            self.error_msg()
        }
    }
}
