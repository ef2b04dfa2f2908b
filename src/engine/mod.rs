//! Template engines: a configured loader chain plus rendering settings.
//!
//! [`Engine`] resolves names through its loaders in priority order and compiles
//! what it finds into [`Template`]s. [`Engines`] layers the same first-match
//! rule over several engines and provides the `render_to_string` family.

mod engines;

pub use engines::{Engines, TemplateNames};

use crate::config::EngineConfig;
use crate::constants::STRING_TEMPLATE_NAME;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::loader::{build_loaders, resolve_in_order, Loader, Origin, TemplateSource};
use crate::package::PackageRegistry;
use crate::template::Template;
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use walkdir::WalkDir;

/// A configured template engine. Cloning is cheap; clones share loaders and caches.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    loaders: Vec<Box<dyn Loader>>,
}

impl Engine {
    /// Creates an engine without any packaged resources.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_packages(config, PackageRegistry::new())
    }

    /// Creates an engine whose packaged-resource loaders read from `packages`.
    pub fn with_packages(config: EngineConfig, packages: PackageRegistry) -> Result<Self> {
        config.validate()?;
        let loaders = build_loaders(&config, &packages);
        debug!(
            "engine '{}' uses loaders [{}]",
            config.name,
            loaders.iter().map(|l| l.kind()).collect::<Vec<_>>().join(", ")
        );
        Ok(Self { inner: Arc::new(EngineInner { config, loaders }) })
    }

    /// Creates an engine around an already built loader chain.
    pub fn with_loaders(config: EngineConfig, loaders: Vec<Box<dyn Loader>>) -> Result<Self> {
        config.validate()?;
        Ok(Self { inner: Arc::new(EngineInner { config, loaders }) })
    }

    pub fn name(&self) -> &str {
        &self.inner.config.name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn loaders(&self) -> &[Box<dyn Loader>] {
        &self.inner.loaders
    }

    /// Resolves `template_name` through the loader chain; the first loader
    /// that has it wins.
    pub fn find_template(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Result<TemplateSource> {
        let loaders = self.inner.loaders.iter().map(|loader| loader.as_ref());
        resolve_in_order(loaders, template_name, dirs)
    }

    pub fn get_template(&self, template_name: &str) -> Result<Template> {
        self.get_template_with_dirs(template_name, None)
    }

    /// Like [`get_template`](Self::get_template) with a per-call directory override.
    pub fn get_template_with_dirs(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Result<Template> {
        let source = self.find_template(template_name, dirs)?;
        Template::compile(self, template_name, source, dirs)
    }

    /// Returns the first of `template_names` that exists.
    ///
    /// # Errors
    /// * [`Error::NoTemplateNames`] when `template_names` is empty
    /// * [`Error::TemplateDoesNotExist`] naming every candidate when none exists
    pub fn select_template<S: AsRef<str>>(
        &self,
        template_names: &[S],
        dirs: Option<&[PathBuf]>,
    ) -> Result<Template> {
        if template_names.is_empty() {
            return Err(Error::NoTemplateNames);
        }
        let mut tried = Vec::new();
        for name in template_names {
            match self.get_template_with_dirs(name.as_ref(), dirs) {
                Ok(template) => return Ok(template),
                Err(Error::TemplateDoesNotExist { tried: more, .. }) => tried.extend(more),
                Err(err) => return Err(err),
            }
        }
        Err(Error::does_not_exist(join_names(template_names), tried))
    }

    /// Compiles an ad-hoc template that did not come from a loader.
    pub fn from_string(&self, source: impl Into<String>) -> Result<Template> {
        let origin = Origin::new(STRING_TEMPLATE_NAME, STRING_TEMPLATE_NAME, "string");
        let source = TemplateSource::new(source, origin);
        Template::compile(self, STRING_TEMPLATE_NAME, source, None)
    }

    /// Selects the first existing template of `names` and renders it with `vars`.
    pub fn render_to_string(
        &self,
        names: impl Into<TemplateNames>,
        vars: Option<&Map<String, Value>>,
        dirs: Option<&[PathBuf]>,
    ) -> Result<String> {
        let template = match names.into() {
            TemplateNames::One(name) => self.get_template_with_dirs(&name, dirs)?,
            TemplateNames::Many(names) => self.select_template(&names, dirs)?,
        };
        template.render_vars(vars)
    }

    /// A context for rendering: the builtins layer, plus a layer for `vars`
    /// only when vars are given.
    pub fn make_context(&self, vars: Option<Map<String, Value>>) -> Context {
        match vars {
            Some(vars) => Context::with_vars(vars),
            None => Context::new(),
        }
    }

    /// Every template name discoverable under the directories of the
    /// filesystem based loaders, sorted.
    pub fn list_templates(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for dir in self.inner.loaders.iter().flat_map(|loader| loader.template_dirs()) {
            for entry in WalkDir::new(&dir)
                .follow_links(true)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_file())
            {
                if let Ok(relative) = entry.path().strip_prefix(&dir) {
                    let parts: Vec<_> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect();
                    names.insert(parts.join("/"));
                }
            }
        }
        names.into_iter().collect()
    }

    /// Clears the state of every loader, including caches.
    pub fn reset(&self) {
        for loader in &self.inner.loaders {
            loader.reset();
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.inner.loaders.iter().map(|l| l.kind()).collect();
        f.debug_struct("Engine")
            .field("name", &self.inner.config.name)
            .field("loaders", &kinds)
            .finish()
    }
}

fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
}
