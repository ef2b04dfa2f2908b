//! Packaged resource bundles ("eggs") that templates can be loaded from.
//!
//! A [`PackageRegistry`] maps an app name to a [`ResourceProvider`]. The
//! packaged-resource loader only consults providers whose app is installed.

use crate::error::{Error, Result};
use crate::ext::PathExt;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Read access to the resources of one package.
///
/// Resource paths are always `/`-separated and relative to the package root.
pub trait ResourceProvider: Send + Sync {
    fn has_resource(&self, path: &str) -> bool;

    fn read_resource(&self, path: &str) -> Result<Vec<u8>>;
}

/// A package whose resources live in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPackage {
    resources: IndexMap<String, Vec<u8>>,
}

impl MemoryPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(
        mut self,
        path: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(path, data);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.resources.insert(normalize(&path.into()), data.into());
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl ResourceProvider for MemoryPackage {
    fn has_resource(&self, path: &str) -> bool {
        self.resources.contains_key(&normalize(path))
    }

    fn read_resource(&self, path: &str) -> Result<Vec<u8>> {
        self.resources
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| Error::does_not_exist(path, Vec::new()))
    }
}

/// A package unpacked on disk, rooted at a directory.
#[derive(Debug, Clone)]
pub struct DirectoryPackage {
    root: PathBuf,
}

impl DirectoryPackage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ResourceProvider for DirectoryPackage {
    fn has_resource(&self, path: &str) -> bool {
        self.root.safe_join(path).is_some_and(|p| p.is_file())
    }

    fn read_resource(&self, path: &str) -> Result<Vec<u8>> {
        let full = self
            .root
            .safe_join(path)
            .filter(|p| p.is_file())
            .ok_or_else(|| Error::does_not_exist(path, Vec::new()))?;
        Ok(std::fs::read(full)?)
    }
}

/// Registered packages, keyed by the app name they belong to.
///
/// Cloning is cheap; providers are shared.
#[derive(Clone, Default)]
pub struct PackageRegistry {
    providers: HashMap<String, Arc<dyn ResourceProvider>>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` for the app `name`, replacing any previous one.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        provider: impl ResourceProvider + 'static,
    ) -> &mut Self {
        self.providers.insert(name.into(), Arc::new(provider));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ResourceProvider>> {
        self.providers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }
}

impl fmt::Debug for PackageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.providers.keys().collect();
        names.sort();
        f.debug_struct("PackageRegistry").field("packages", &names).finish()
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn memory_package_normalizes_separators() {
        let package = MemoryPackage::new().with_resource("templates\\y.html", "y");
        assert!(package.has_resource("templates/y.html"));
        assert_eq!(package.read_resource("templates/y.html").unwrap(), b"y");
    }

    #[test]
    fn memory_package_missing_resource() {
        let package = MemoryPackage::new();
        assert!(package.is_empty());
        assert!(!package.has_resource("templates/x.txt"));
        assert!(package.read_resource("templates/x.txt").unwrap_err().is_does_not_exist());
    }

    #[test]
    fn directory_package_reads_files_under_root() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("templates")).unwrap();
        fs::write(root.path().join("templates/x.txt"), "x").unwrap();
        fs::write(root.path().join("outside.txt"), "no").unwrap();

        let package = DirectoryPackage::new(root.path().join("templates"));
        assert!(package.has_resource("x.txt"));
        assert!(!package.has_resource("../outside.txt"));
        assert_eq!(package.read_resource("x.txt").unwrap(), b"x");
    }

    #[test]
    fn registry_replaces_and_lists() {
        let mut registry = PackageRegistry::new();
        registry
            .register("egg_1", MemoryPackage::new().with_resource("a", "1"))
            .register("egg_1", MemoryPackage::new().with_resource("a", "2"));
        let provider = registry.get("egg_1").unwrap();
        assert_eq!(provider.read_resource("a").unwrap(), b"2");
        assert!(!registry.contains("egg_2"));
    }
}
