//! Basic types for engine configuration

use crate::constants::DEFAULT_ENGINE_NAME;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An installed application that may ship templates.
///
/// In configuration files an app is either a bare name or a
/// `{ name, path, package }` map. `path` is the app's directory, searched by
/// the app-directories loader; `package` is the root of its packaged
/// resources, read by the packaged-resource loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawInstalledApp")]
pub struct InstalledApp {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<PathBuf>,
}

impl InstalledApp {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), path: None, package: None }
    }

    pub fn with_path(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()), ..Self::new(name) }
    }

    pub fn with_package(name: impl Into<String>, package: impl Into<PathBuf>) -> Self {
        Self { package: Some(package.into()), ..Self::new(name) }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInstalledApp {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        path: Option<PathBuf>,
        #[serde(default)]
        package: Option<PathBuf>,
    },
}

impl From<RawInstalledApp> for InstalledApp {
    fn from(raw: RawInstalledApp) -> Self {
        match raw {
            RawInstalledApp::Name(name) => InstalledApp::new(name),
            RawInstalledApp::Full { name, path, package } => {
                InstalledApp { name, path, package }
            }
        }
    }
}

/// One entry of an engine's loader chain.
///
/// Plain loaders are written as their name (`filesystem`); loaders with
/// settings as a single-key map (`cached: [...]`, `locmem: {...}`). The same
/// shape is read from YAML and JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawLoaderSpec", into = "RawLoaderSpec")]
pub enum LoaderSpec {
    /// Templates under the engine's `dirs` (or a per-call override).
    Filesystem,
    /// Templates under `<app>/templates` for every installed app.
    AppDirectories,
    /// Packaged resources registered for installed apps.
    Eggs,
    /// Templates given inline, by name.
    Locmem(IndexMap<String, String>),
    /// A caching wrapper around the nested chain.
    Cached(Vec<LoaderSpec>),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum LoaderKind {
    Filesystem,
    AppDirectories,
    Eggs,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawLoaderSpec {
    Kind(LoaderKind),
    Cached { cached: Vec<LoaderSpec> },
    Locmem { locmem: IndexMap<String, String> },
}

impl From<RawLoaderSpec> for LoaderSpec {
    fn from(raw: RawLoaderSpec) -> Self {
        match raw {
            RawLoaderSpec::Kind(LoaderKind::Filesystem) => LoaderSpec::Filesystem,
            RawLoaderSpec::Kind(LoaderKind::AppDirectories) => LoaderSpec::AppDirectories,
            RawLoaderSpec::Kind(LoaderKind::Eggs) => LoaderSpec::Eggs,
            RawLoaderSpec::Cached { cached } => LoaderSpec::Cached(cached),
            RawLoaderSpec::Locmem { locmem } => LoaderSpec::Locmem(locmem),
        }
    }
}

impl From<LoaderSpec> for RawLoaderSpec {
    fn from(spec: LoaderSpec) -> Self {
        match spec {
            LoaderSpec::Filesystem => RawLoaderSpec::Kind(LoaderKind::Filesystem),
            LoaderSpec::AppDirectories => RawLoaderSpec::Kind(LoaderKind::AppDirectories),
            LoaderSpec::Eggs => RawLoaderSpec::Kind(LoaderKind::Eggs),
            LoaderSpec::Cached(cached) => RawLoaderSpec::Cached { cached },
            LoaderSpec::Locmem(locmem) => RawLoaderSpec::Locmem { locmem },
        }
    }
}

/// Settings of a single template engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "get_default_engine_name")]
    pub name: String,
    /// Directories searched by the filesystem loader, in order.
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    /// Whether the default chain includes the app-directories loader.
    #[serde(default)]
    pub app_dirs: bool,
    #[serde(default)]
    pub installed_apps: Vec<InstalledApp>,
    /// Explicit loader chain. Must not be combined with `app_dirs`.
    #[serde(default)]
    pub loaders: Option<Vec<LoaderSpec>>,
    /// Rendered in place of undefined variables.
    #[serde(default)]
    pub string_if_invalid: String,
    /// Undefined variables become render errors instead of `string_if_invalid`.
    #[serde(default)]
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: get_default_engine_name(),
            dirs: Vec::new(),
            app_dirs: false,
            installed_apps: Vec::new(),
            loaders: None,
            string_if_invalid: String::new(),
            debug: false,
        }
    }
}

impl EngineConfig {
    /// An engine searching `dirs` with the default loader chain.
    pub fn with_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { dirs: dirs.into_iter().map(Into::into).collect(), ..Default::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_dirs && self.loaders.is_some() {
            return Err(Error::ConfigValidation(format!(
                "engine '{}': app_dirs must not be set when loaders is defined",
                self.name
            )));
        }
        if self.name.is_empty() {
            return Err(Error::ConfigValidation("engine name must not be empty".into()));
        }
        Ok(())
    }
}

fn get_default_engine_name() -> String {
    DEFAULT_ENGINE_NAME.to_string()
}
