use crate::config::{EngineConfig, LoaderSpec};
use crate::error::{Error, Result};
use crate::package::PackageRegistry;
use log::trace;
use std::path::PathBuf;

pub mod app_directories;
pub mod cached;
pub mod filesystem;
pub mod interface;
pub mod locmem;
pub mod package;

pub use app_directories::AppDirectoriesLoader;
pub use cached::{CacheEntry, CacheKey, CachedLoader};
pub use filesystem::FilesystemLoader;
pub use interface::{Loader, Origin, TemplateSource};
pub use locmem::LocMemLoader;
pub use package::PackageLoader;

/// Tries each loader in turn and returns the first match.
///
/// A "does not exist" failure moves on to the next loader; any other error
/// stops the lookup. When every loader fails, the returned error carries the
/// origins tried by all of them.
pub fn resolve_in_order<'a>(
    loaders: impl IntoIterator<Item = &'a dyn Loader>,
    template_name: &str,
    dirs: Option<&[PathBuf]>,
) -> Result<TemplateSource> {
    let mut tried = Vec::new();
    for loader in loaders {
        match loader.find_template(template_name, dirs) {
            Ok(source) => return Ok(source),
            Err(Error::TemplateDoesNotExist { tried: more, .. }) => {
                trace!("{} loader has no '{template_name}'", loader.kind());
                tried.extend(more);
            }
            Err(err) => return Err(err),
        }
    }
    Err(Error::does_not_exist(template_name, tried))
}

/// Instantiates the loader chain an engine is configured with.
///
/// Without explicit `loaders`, the chain is the filesystem loader followed by
/// the app-directories loader when `app_dirs` is set.
pub fn build_loaders(
    config: &EngineConfig,
    packages: &PackageRegistry,
) -> Vec<Box<dyn Loader>> {
    match &config.loaders {
        Some(specs) => {
            specs.iter().map(|spec| build_loader(spec, config, packages)).collect()
        }
        None => {
            let mut loaders: Vec<Box<dyn Loader>> =
                vec![Box::new(FilesystemLoader::new(config.dirs.iter().cloned()))];
            if config.app_dirs {
                loaders.push(Box::new(AppDirectoriesLoader::new(&config.installed_apps)));
            }
            loaders
        }
    }
}

fn build_loader(
    spec: &LoaderSpec,
    config: &EngineConfig,
    packages: &PackageRegistry,
) -> Box<dyn Loader> {
    match spec {
        LoaderSpec::Filesystem => {
            Box::new(FilesystemLoader::new(config.dirs.iter().cloned()))
        }
        LoaderSpec::AppDirectories => {
            Box::new(AppDirectoriesLoader::new(&config.installed_apps))
        }
        LoaderSpec::Eggs => {
            Box::new(PackageLoader::new(&config.installed_apps, packages.clone()))
        }
        LoaderSpec::Locmem(templates) => Box::new(LocMemLoader::new(templates.clone())),
        LoaderSpec::Cached(specs) => Box::new(CachedLoader::new(
            specs.iter().map(|spec| build_loader(spec, config, packages)).collect(),
        )),
    }
}
