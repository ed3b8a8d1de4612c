pub mod models;
pub mod collector;
#[cfg(windows)]
mod win32;

pub use models::{decode_value, RegistryValue};
pub use collector::{CurrentUserRegistry, RegistryCollector, RegistrySource};
