use crate::error::{Error, Result};
use log::trace;
use std::fmt;
use std::path::PathBuf;

/// A place a loader looked for a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    /// Human readable location: a file path, `egg:<app>:templates/<name>`, ...
    pub name: String,
    /// The template name that was requested.
    pub template_name: String,
    /// Kind of the loader that produced this origin.
    pub loader: &'static str,
}

impl Origin {
    pub fn new(
        name: impl Into<String>,
        template_name: impl Into<String>,
        loader: &'static str,
    ) -> Self {
        Self { name: name.into(), template_name: template_name.into(), loader }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.loader)
    }
}

/// Resolved template content together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub contents: String,
    pub origin: Origin,
}

impl TemplateSource {
    pub fn new(contents: impl Into<String>, origin: Origin) -> Self {
        Self { contents: contents.into(), origin }
    }

    /// The origin's display name, e.g. `egg:egg_1:templates/y.html`.
    pub fn display_name(&self) -> &str {
        &self.origin.name
    }
}

/// Pluggable strategy that resolves a template name to source content.
///
/// Implementors describe *where* a name could live with
/// [`get_template_sources`](Loader::get_template_sources) and how to read one
/// location with [`get_contents`](Loader::get_contents); the provided methods
/// walk those locations in order.
pub trait Loader: Send + Sync {
    /// Short identifier of the loader, used in origins and logs.
    fn kind(&self) -> &'static str;

    /// Candidate origins for `template_name`, in the order they should be tried.
    ///
    /// # Arguments
    /// * `template_name` - The requested name
    /// * `dirs` - Per-call directory override, honored by directory based loaders
    fn get_template_sources(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Vec<Origin>;

    /// Reads the contents behind `origin`.
    ///
    /// # Returns
    /// * `Err(Error::TemplateDoesNotExist)` - nothing lives at this origin
    /// * any other error - the origin exists but could not be read
    fn get_contents(&self, origin: &Origin) -> Result<String>;

    /// Returns the first origin whose contents can be read.
    fn load_template_source(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Result<TemplateSource> {
        let mut tried = Vec::new();
        for origin in self.get_template_sources(template_name, dirs) {
            match self.get_contents(&origin) {
                Ok(contents) => return Ok(TemplateSource::new(contents, origin)),
                Err(err) if err.is_does_not_exist() => {
                    trace!("{} loader: '{}' not found", self.kind(), origin.name);
                    tried.push(origin);
                }
                Err(err) => return Err(err),
            }
        }
        Err(Error::does_not_exist(template_name, tried))
    }

    /// Entry point used by engines. Caching loaders override this.
    fn find_template(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Result<TemplateSource> {
        self.load_template_source(template_name, dirs)
    }

    /// Directories this loader reads files from, used for template discovery.
    fn template_dirs(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Drops any state kept between lookups.
    fn reset(&self) {}
}
