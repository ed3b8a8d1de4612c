pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod traits;
pub mod utils;

pub use error::*;
pub use traits::*;
