//! Configuration management

pub mod file_config;
pub mod loader;

pub use file_config::{ApiConfig, FileConfig, StorageConfig};
pub use loader::ConfigLoader;
