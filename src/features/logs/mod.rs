pub mod reader;
pub mod collector;

pub use reader::{read_log_content, truncation_notice};
pub use collector::LogCollector;
