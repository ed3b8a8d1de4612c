pub mod cookies;
pub mod filesystem;
pub mod logs;
pub mod registry;
pub mod settings;
