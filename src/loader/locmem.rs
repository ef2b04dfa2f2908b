use crate::constants::loader_kinds;
use crate::error::{Error, Result};
use crate::loader::interface::{Loader, Origin};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Loader for templates held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct LocMemLoader {
    templates: IndexMap<String, String>,
}

impl LocMemLoader {
    pub fn new<I, K, V>(templates: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let templates =
            templates.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { templates }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl Loader for LocMemLoader {
    fn kind(&self) -> &'static str {
        loader_kinds::LOCMEM
    }

    fn get_template_sources(
        &self,
        template_name: &str,
        _dirs: Option<&[PathBuf]>,
    ) -> Vec<Origin> {
        vec![Origin::new(format!("locmem:{template_name}"), template_name, self.kind())]
    }

    fn get_contents(&self, origin: &Origin) -> Result<String> {
        self.templates
            .get(&origin.template_name)
            .cloned()
            .ok_or_else(|| Error::does_not_exist(&origin.template_name, vec![origin.clone()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_names() {
        let loader = LocMemLoader::new([("index.html", "hello")]);
        let source = loader.load_template_source("index.html", None).unwrap();
        assert_eq!(source.contents, "hello");
        assert_eq!(source.display_name(), "locmem:index.html");
    }

    #[test]
    fn unknown_names_do_not_exist() {
        let loader = LocMemLoader::new([("index.html", "hello")]);
        let err = loader.load_template_source("other.html", None).unwrap_err();
        assert!(err.is_does_not_exist());
        assert_eq!(loader.names().collect::<Vec<_>>(), vec!["index.html"]);
    }
}
