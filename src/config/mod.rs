//! Configuration management for template engines
//!
//! This module contains the configuration system components:
//! - `types`: Engine settings, loader chain entries and installed apps
//! - `loader`: Configuration file loading and parsing

pub mod loader;
pub mod types;


// Re-export commonly used types for convenience
pub use loader::Config;
pub use types::{EngineConfig, InstalledApp, LoaderSpec};
