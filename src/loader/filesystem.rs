use crate::constants::loader_kinds;
use crate::error::{Error, Result};
use crate::ext::PathExt;
use crate::loader::interface::{Loader, Origin};
use log::warn;
use std::path::{Path, PathBuf};

/// Loader for templates stored under a list of filesystem directories.
///
/// Directories are searched in order. A non-empty per-call `dirs` override
/// replaces the configured list for that lookup.
#[derive(Debug, Clone, Default)]
pub struct FilesystemLoader {
    dirs: Vec<PathBuf>,
}

impl FilesystemLoader {
    /// Creates a new FilesystemLoader searching `dirs` in order.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { dirs: dirs.into_iter().map(Into::into).collect() }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl Loader for FilesystemLoader {
    fn kind(&self) -> &'static str {
        loader_kinds::FILESYSTEM
    }

    fn get_template_sources(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Vec<Origin> {
        let dirs = dirs.filter(|dirs| !dirs.is_empty()).unwrap_or(&self.dirs);
        origins_in_dirs(dirs.iter(), template_name, self.kind())
    }

    fn get_contents(&self, origin: &Origin) -> Result<String> {
        read_template_file(origin)
    }

    fn template_dirs(&self) -> Vec<PathBuf> {
        self.dirs.clone()
    }
}

/// Builds one origin per directory that `template_name` can be safely joined onto.
pub(crate) fn origins_in_dirs<'a>(
    dirs: impl Iterator<Item = &'a PathBuf>,
    template_name: &str,
    kind: &'static str,
) -> Vec<Origin> {
    let mut origins = Vec::new();
    for dir in dirs {
        match dir.safe_join(template_name) {
            Some(path) => origins.push(Origin::new(
                path.display().to_string(),
                template_name,
                kind,
            )),
            None => {
                warn!(
                    "Refusing to look up '{template_name}' outside of '{}'",
                    dir.display()
                );
            }
        }
    }
    origins
}

/// Reads the file named by `origin`, mapping a missing file to "does not exist".
pub(crate) fn read_template_file(origin: &Origin) -> Result<String> {
    let path = Path::new(&origin.name);
    if !path.is_file() {
        return Err(Error::does_not_exist(&origin.template_name, vec![origin.clone()]));
    }
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::does_not_exist(
                &origin.template_name,
                vec![origin.clone()],
            ));
        }
        Err(err) => return Err(Error::IoError(err)),
    };
    String::from_utf8(bytes)
        .map_err(|_| Error::InvalidEncoding { origin: origin.name.clone() })
}
