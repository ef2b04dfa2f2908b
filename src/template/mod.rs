//! Compiled templates bound to the engine that loaded them.

use crate::context::Context;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::loader::{Origin, TemplateSource};
use crate::renderer::build_environment;
use minijinja::Environment;
use serde_json::{Map, Value};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A template whose source compiled successfully.
///
/// Each template owns the environment it was compiled in. `{% include %}` and
/// `{% extends %}` resolve through the engine that loaded it, using the same
/// directory override, and are compiled once per template.
#[derive(Clone)]
pub struct Template {
    name: String,
    origin: Origin,
    source: String,
    engine: Engine,
    env: Arc<Environment<'static>>,
}

impl Template {
    /// Compiles `source`, failing with [`Error::TemplateSyntaxError`] on invalid syntax.
    pub(crate) fn compile(
        engine: &Engine,
        name: &str,
        source: TemplateSource,
        dirs: Option<&[PathBuf]>,
    ) -> Result<Self> {
        let mut env = build_environment(engine, dirs.map(<[PathBuf]>::to_vec));
        env.add_template_owned(name.to_string(), source.contents.clone()).map_err(
            |err| Error::TemplateSyntaxError { name: name.to_string(), source: err },
        )?;

        Ok(Self {
            name: name.to_string(),
            origin: source.origin,
            source: source.contents,
            engine: engine.clone(),
            env: Arc::new(env),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Renders with every layer of `context` flattened into one namespace.
    pub fn render(&self, context: &Context) -> Result<String> {
        let template = self.env.get_template(&self.name)?;
        Ok(template.render(context.flatten())?)
    }

    /// Renders with a fresh context holding `vars`, if any.
    pub fn render_vars(&self, vars: Option<&Map<String, Value>>) -> Result<String> {
        self.render(&self.engine.make_context(vars.cloned()))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("engine", &self.engine.name())
            .finish()
    }
}
