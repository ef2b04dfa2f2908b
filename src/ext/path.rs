use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Extension trait for Path to provide conversions and safe joining of template names
pub trait PathExt {
    /// Converts a path to a string slice, returning an error if the path contains
    /// invalid Unicode characters.
    ///
    /// This is a convenience method that's equivalent to `path.to_str().ok_or_else(...)` but with
    /// a descriptive error message.
    ///
    /// # Examples
    /// ```
    /// use stencil::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let path = Path::new("test");
    /// assert_eq!(path.to_str_checked().unwrap(), "test");
    /// ```
    fn to_str_checked(&self) -> Result<&str>;

    /// Joins a slash-separated template name onto this directory.
    ///
    /// Returns `None` when the name is absolute or when its `..` components would
    /// climb above the directory. The check is purely lexical; symlinks are not
    /// resolved.
    ///
    /// # Examples
    /// ```
    /// use stencil::ext::PathExt;
    /// use std::path::Path;
    ///
    /// let base = Path::new("/srv/templates");
    /// assert_eq!(
    ///     base.safe_join("blog/../index.html").unwrap(),
    ///     Path::new("/srv/templates/index.html")
    /// );
    /// assert!(base.safe_join("../secrets.txt").is_none());
    /// ```
    fn safe_join(&self, name: &str) -> Option<PathBuf>;
}

impl PathExt for Path {
    fn to_str_checked(&self) -> Result<&str> {
        self.to_str().ok_or_else(|| {
            Error::Other(anyhow::anyhow!(
                "Path '{}' contains invalid Unicode characters",
                self.display()
            ))
        })
    }

    fn safe_join(&self, name: &str) -> Option<PathBuf> {
        let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
        for component in Path::new(name).components() {
            match component {
                Component::Normal(part) => parts.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    parts.pop()?;
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if parts.is_empty() {
            return None;
        }
        let mut joined = self.to_path_buf();
        joined.extend(parts);
        Some(joined)
    }
}
