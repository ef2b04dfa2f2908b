//! Constants used throughout stencil

/// Configuration file names in order of preference
pub const CONFIG_FILENAMES: &[&str] = &["stencil.json", "stencil.yaml", "stencil.yml"];

/// Directory inside an installed app that holds its templates
pub const APP_TEMPLATES_DIR: &str = "templates";

/// Prefix of the resource path used by packaged-resource loaders
pub const PACKAGE_RESOURCE_PREFIX: &str = "templates";

/// Name given to an engine that does not declare one
pub const DEFAULT_ENGINE_NAME: &str = "default";

/// Name used for templates compiled from a string
pub const STRING_TEMPLATE_NAME: &str = "<string>";

/// STDIN indicator for CLI arguments
pub const STDIN_INDICATOR: &str = "-";

/// Loader kinds, as reported by origins and accepted in configuration
pub mod loader_kinds {
    pub const FILESYSTEM: &str = "filesystem";
    pub const APP_DIRECTORIES: &str = "app_directories";
    pub const PACKAGE: &str = "eggs";
    pub const LOCMEM: &str = "locmem";
    pub const CACHED: &str = "cached";
}

/// Exit codes
pub mod exit_codes {
    pub const FAILURE: i32 = 1;
}

/// Verbosity levels
pub mod verbosity {
    pub const OFF: u8 = 0;
    pub const INFO: u8 = 1;
    pub const DEBUG: u8 = 2;
    pub const TRACE: u8 = 3;
}
