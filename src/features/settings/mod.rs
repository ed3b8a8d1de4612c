pub mod models;
pub mod collector;

pub use models::{ExtractionOutcome, ExtractionResult};
pub use collector::{extract_keys, read_settings_file, read_settings_files};
