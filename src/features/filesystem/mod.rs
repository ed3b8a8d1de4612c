pub mod tree;
pub mod collector;

pub use tree::render_folder_tree;
pub use collector::{resolve_target_directory, AppDataCollector};
