/// Command line front end.
pub mod cli;

/// Engine configuration and configuration files.
pub mod config;

/// Constants shared across modules.
pub mod constants;

/// Layered template context.
pub mod context;

/// Engines and the rendering convenience API.
pub mod engine;

/// Defines custom error types.
pub mod error;

/// Extension traits for standard library types.
pub mod ext;

/// Pluggable template loaders, including the caching loader.
pub mod loader;

/// Packaged resource bundles used by the packaged-resource loader.
pub mod package;

/// MiniJinja environments wired to engines.
pub mod renderer;

/// Compiled templates.
pub mod template;

pub use config::{Config, EngineConfig, InstalledApp, LoaderSpec};
pub use context::Context;
pub use engine::{Engine, Engines, TemplateNames};
pub use error::{Error, Result};
pub use loader::{CacheEntry, CacheKey, CachedLoader, Loader, Origin, TemplateSource};
pub use package::{DirectoryPackage, MemoryPackage, PackageRegistry, ResourceProvider};
pub use template::Template;
