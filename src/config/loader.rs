//! Configuration loading and management

use crate::config::types::EngineConfig;
use crate::constants::CONFIG_FILENAMES;
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::package::{DirectoryPackage, PackageRegistry};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Top level configuration: every template engine, in lookup order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub engines: Vec<EngineConfig>,
}

impl Config {
    pub fn new(engines: Vec<EngineConfig>) -> Self {
        Self { engines }
    }

    /// Loads the configuration from `path`.
    ///
    /// `path` is either a configuration file or a directory, in which case the
    /// first of [`CONFIG_FILENAMES`] that exists is used. Relative `dirs` and
    /// app paths are resolved against the directory holding the file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_file = if path.is_dir() {
            Self::find_config_file(path)?
        } else {
            path.to_path_buf()
        };

        debug!("Loading configuration from '{}'.", config_file.display());
        let content = std::fs::read_to_string(&config_file)?;
        let mut config = Self::parse(&config_file, &content)?;

        if let Some(base) = config_file.parent() {
            config.resolve_relative_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    fn find_config_file(config_dir: &Path) -> Result<PathBuf> {
        CONFIG_FILENAMES
            .iter()
            .map(|name| config_dir.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::ConfigNotFound {
                config_dir: config_dir.display().to_string(),
                config_files: CONFIG_FILENAMES.join(", "),
            })
    }

    fn parse(config_file: &Path, content: &str) -> Result<Self> {
        let file_name = config_file.to_str_checked()?;
        if file_name.ends_with(".json") {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(serde_yaml::from_str(content)?)
        }
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        for engine in &mut self.engines {
            for dir in &mut engine.dirs {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
            for app in &mut engine.installed_apps {
                for path in [app.path.as_mut(), app.package.as_mut()].into_iter().flatten() {
                    if path.is_relative() {
                        *path = base.join(&*path);
                    }
                }
            }
        }
    }

    /// Packaged resources of every installed app that declares a `package` root.
    ///
    /// An app installed in several engines must point at the same root each time.
    pub fn packages(&self) -> Result<PackageRegistry> {
        let mut roots: HashMap<&str, &Path> = HashMap::new();
        let mut packages = PackageRegistry::new();
        for app in self.engines.iter().flat_map(|engine| &engine.installed_apps) {
            let Some(root) = app.package.as_deref() else {
                continue;
            };
            match roots.insert(&app.name, root) {
                Some(previous) if previous != root => {
                    return Err(Error::ConfigValidation(format!(
                        "app '{}' has packages at both '{}' and '{}'",
                        app.name,
                        previous.display(),
                        root.display()
                    )));
                }
                Some(_) => {}
                None => {
                    debug!("Registering package for '{}' at '{}'.", app.name, root.display());
                    packages.register(app.name.clone(), DirectoryPackage::new(root));
                }
            }
        }
        Ok(packages)
    }

    pub fn validate(&self) -> Result<()> {
        if self.engines.is_empty() {
            return Err(Error::ConfigValidation(
                "at least one engine must be configured".into(),
            ));
        }
        let mut seen = HashSet::new();
        for engine in &self.engines {
            engine.validate()?;
            if !seen.insert(engine.name.as_str()) {
                return Err(Error::ConfigValidation(format!(
                    "engine name '{}' is used more than once",
                    engine.name
                )));
            }
        }
        Ok(())
    }
}
