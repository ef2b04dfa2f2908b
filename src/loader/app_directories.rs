use crate::config::InstalledApp;
use crate::constants::{loader_kinds, APP_TEMPLATES_DIR};
use crate::error::Result;
use crate::loader::filesystem::{origins_in_dirs, read_template_file};
use crate::loader::interface::{Loader, Origin};
use std::path::PathBuf;

/// Loader for templates shipped in the `templates/` directory of installed apps.
///
/// Apps are searched in installation order. Apps without a filesystem path are
/// skipped. Per-call directory overrides do not apply to this loader.
#[derive(Debug, Clone, Default)]
pub struct AppDirectoriesLoader {
    dirs: Vec<PathBuf>,
}

impl AppDirectoriesLoader {
    pub fn new(apps: &[InstalledApp]) -> Self {
        let dirs = apps
            .iter()
            .filter_map(|app| app.path.as_ref())
            .map(|path| path.join(APP_TEMPLATES_DIR))
            .filter(|dir| dir.is_dir())
            .collect();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl Loader for AppDirectoriesLoader {
    fn kind(&self) -> &'static str {
        loader_kinds::APP_DIRECTORIES
    }

    fn get_template_sources(
        &self,
        template_name: &str,
        _dirs: Option<&[PathBuf]>,
    ) -> Vec<Origin> {
        origins_in_dirs(self.dirs.iter(), template_name, self.kind())
    }

    fn get_contents(&self, origin: &Origin) -> Result<String> {
        read_template_file(origin)
    }

    fn template_dirs(&self) -> Vec<PathBuf> {
        self.dirs.clone()
    }
}
