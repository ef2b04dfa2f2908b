use crate::config::Config;
use crate::context::Context;
use crate::engine::{join_names, Engine};
use crate::error::{Error, Result};
use crate::package::PackageRegistry;
use crate::template::Template;
use log::debug;
use serde_json::{Map, Value};
use std::path::PathBuf;

/// One template name, or a list of candidates where the first existing one wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNames {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for TemplateNames {
    fn from(name: &str) -> Self {
        TemplateNames::One(name.to_string())
    }
}

impl From<String> for TemplateNames {
    fn from(name: String) -> Self {
        TemplateNames::One(name)
    }
}

impl From<Vec<String>> for TemplateNames {
    fn from(names: Vec<String>) -> Self {
        TemplateNames::Many(names)
    }
}

impl From<Vec<&str>> for TemplateNames {
    fn from(names: Vec<&str>) -> Self {
        TemplateNames::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for TemplateNames {
    fn from(names: &[&str]) -> Self {
        TemplateNames::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TemplateNames {
    fn from(names: [&str; N]) -> Self {
        TemplateNames::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

/// Every configured engine, consulted in order.
#[derive(Debug, Clone)]
pub struct Engines {
    engines: Vec<Engine>,
}

impl Engines {
    pub fn new(engines: Vec<Engine>) -> Self {
        Self { engines }
    }

    /// Builds every engine of `config`, sharing `packages` between them.
    pub fn from_config(config: &Config, packages: &PackageRegistry) -> Result<Self> {
        config.validate()?;
        let engines = config
            .engines
            .iter()
            .map(|engine| Engine::with_packages(engine.clone(), packages.clone()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { engines })
    }

    pub fn all(&self) -> &[Engine] {
        &self.engines
    }

    pub fn get(&self, name: &str) -> Option<&Engine> {
        self.engines.iter().find(|engine| engine.name() == name)
    }

    /// Loads `template_name` from the first engine that has it.
    ///
    /// When no engine has it, the origins tried by all of them are chained
    /// into one error.
    pub fn get_template(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Result<Template> {
        let mut tried = Vec::new();
        for engine in &self.engines {
            match engine.get_template_with_dirs(template_name, dirs) {
                Ok(template) => return Ok(template),
                Err(Error::TemplateDoesNotExist { tried: more, .. }) => {
                    debug!("engine '{}' has no '{template_name}'", engine.name());
                    tried.extend(more);
                }
                Err(err) => return Err(err),
            }
        }
        Err(Error::does_not_exist(template_name, tried))
    }

    /// Loads the first of `template_names` that any engine has.
    ///
    /// Names are tried in order, and for each name every engine in order.
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
            match self.get_template(name.as_ref(), dirs) {
                Ok(template) => return Ok(template),
                Err(Error::TemplateDoesNotExist { tried: more, .. }) => tried.extend(more),
                Err(err) => return Err(err),
            }
        }
        Err(Error::does_not_exist(join_names(template_names), tried))
    }

    /// Loads `names` and renders the template with a fresh context holding `vars`.
    pub fn render_to_string(
        &self,
        names: impl Into<TemplateNames>,
        vars: Option<&Map<String, Value>>,
        dirs: Option<&[PathBuf]>,
    ) -> Result<String> {
        self.resolve(names.into(), dirs)?.render_vars(vars)
    }

    /// Loads `names` and renders the template with an existing `context`.
    ///
    /// Non-empty `vars` are pushed onto the context for the render only; the
    /// context is left exactly as it was, whether rendering succeeds or not.
    pub fn render_to_string_in(
        &self,
        names: impl Into<TemplateNames>,
        vars: Option<&Map<String, Value>>,
        context: &mut Context,
        dirs: Option<&[PathBuf]>,
    ) -> Result<String> {
        let template = self.resolve(names.into(), dirs)?;
        context.scoped(vars, |context| template.render(context))
    }

    fn resolve(&self, names: TemplateNames, dirs: Option<&[PathBuf]>) -> Result<Template> {
        match names {
            TemplateNames::One(name) => self.get_template(&name, dirs),
            TemplateNames::Many(names) => self.select_template(&names, dirs),
        }
    }

    /// Resets every engine's loaders.
    pub fn reset(&self) {
        for engine in &self.engines {
            engine.reset();
        }
    }
}
