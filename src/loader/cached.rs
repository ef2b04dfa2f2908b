//! Caching wrapper around an ordered chain of loaders.
//!
//! Lookups are memoized per cache key, including failed ones: once a name has
//! been looked up and found nowhere, the [`CacheEntry::Missing`] sentinel makes
//! later lookups fail straight away without consulting the wrapped loaders.
//! Errors other than "does not exist" are never cached.

use crate::constants::loader_kinds;
use crate::error::{Error, Result};
use crate::loader::interface::{Loader, Origin, TemplateSource};
use crate::loader::resolve_in_order;
use log::{debug, trace};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What the cache remembers about one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    /// A wrapped loader resolved the name.
    Found(Arc<TemplateSource>),
    /// Every wrapped loader was tried and none had the name.
    Missing,
}

impl CacheEntry {
    pub fn is_missing(&self) -> bool {
        matches!(self, CacheEntry::Missing)
    }
}

/// Key under which one lookup is cached: the template name plus, when a
/// directory override was given, a SHA-256 digest of those directories.
///
/// The name and the digest are kept apart, so a lookup with an override never
/// shares an entry with any lookup without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    template_name: String,
    dirs_digest: Option<[u8; 32]>,
}

impl CacheKey {
    pub fn new(template_name: &str, dirs: Option<&[PathBuf]>) -> Self {
        let dirs_digest = dirs.filter(|dirs| !dirs.is_empty()).map(|dirs| {
            let mut hasher = Sha256::new();
            for dir in dirs {
                hasher.update(dir.as_os_str().as_encoded_bytes());
                hasher.update([0]);
            }
            let digest: [u8; 32] = hasher.finalize().into();
            digest
        });
        Self { template_name: template_name.to_string(), dirs_digest }
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    pub fn has_dirs(&self) -> bool {
        self.dirs_digest.is_some()
    }
}

impl From<&str> for CacheKey {
    fn from(template_name: &str) -> Self {
        Self::new(template_name, None)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dirs_digest {
            Some(digest) => write!(f, "{} [dirs {}]", self.template_name, hex::encode(digest)),
            None => f.write_str(&self.template_name),
        }
    }
}

pub struct CachedLoader {
    loaders: Vec<Box<dyn Loader>>,
    template_cache: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl CachedLoader {
    /// Wraps `loaders`; they are consulted in the given order.
    pub fn new(loaders: Vec<Box<dyn Loader>>) -> Self {
        Self { loaders, template_cache: Mutex::new(HashMap::new()) }
    }

    pub fn loaders(&self) -> &[Box<dyn Loader>] {
        &self.loaders
    }

    /// Key under which a lookup of `template_name` is cached.
    ///
    /// An empty directory override keys the same as no override.
    pub fn cache_key(template_name: &str, dirs: Option<&[PathBuf]>) -> CacheKey {
        CacheKey::new(template_name, dirs)
    }

    /// The entry stored under `key`, if that key was ever looked up.
    pub fn cache_entry(&self, key: impl Into<CacheKey>) -> Option<CacheEntry> {
        self.cache().get(&key.into()).cloned()
    }

    /// Number of cached keys, found and missing alike.
    pub fn cache_len(&self) -> usize {
        self.cache().len()
    }

    /// Resolves `template_name`, consulting the cache first.
    ///
    /// # Returns
    /// * `Ok(source)` - from the cache, or from the first wrapped loader that has it
    /// * `Err(Error::TemplateDoesNotExist)` - the name is cached as missing, or
    ///   no wrapped loader has it (the miss is then cached)
    pub fn load_template(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Result<Arc<TemplateSource>> {
        let key = Self::cache_key(template_name, dirs);

        let cached = self.cache().get(&key).cloned();
        match cached {
            Some(CacheEntry::Found(source)) => {
                trace!("template cache hit for '{key}'");
                return Ok(source);
            }
            Some(CacheEntry::Missing) => {
                debug!("'{template_name}' is cached as missing");
                return Err(Error::does_not_exist(template_name, Vec::new()));
            }
            None => {}
        }

        // The lock is not held while the wrapped loaders run.
        let loaders = self.loaders.iter().map(|loader| loader.as_ref());
        match resolve_in_order(loaders, template_name, dirs) {
            Ok(source) => {
                debug!("caching '{template_name}' from {}", source.origin);
                let source = Arc::new(source);
                self.cache().insert(key, CacheEntry::Found(Arc::clone(&source)));
                Ok(source)
            }
            Err(err) if err.is_does_not_exist() => {
                debug!("caching miss for '{template_name}'");
                self.cache().insert(key, CacheEntry::Missing);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.template_cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Loader for CachedLoader {
    fn kind(&self) -> &'static str {
        loader_kinds::CACHED
    }

    fn get_template_sources(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Vec<Origin> {
        self.loaders
            .iter()
            .flat_map(|loader| loader.get_template_sources(template_name, dirs))
            .collect()
    }

    fn get_contents(&self, origin: &Origin) -> Result<String> {
        for loader in self.loaders.iter().filter(|l| l.kind() == origin.loader) {
            match loader.get_contents(origin) {
                Err(err) if err.is_does_not_exist() => continue,
                result => return result,
            }
        }
        Err(Error::does_not_exist(&origin.template_name, vec![origin.clone()]))
    }

    fn find_template(
        &self,
        template_name: &str,
        dirs: Option<&[PathBuf]>,
    ) -> Result<TemplateSource> {
        self.load_template(template_name, dirs).map(Arc::unwrap_or_clone)
    }

    fn template_dirs(&self) -> Vec<PathBuf> {
        self.loaders.iter().flat_map(|loader| loader.template_dirs()).collect()
    }

    fn reset(&self) {
        self.cache().clear();
        for loader in &self.loaders {
            loader.reset();
        }
    }
}

impl fmt::Debug for CachedLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kinds: Vec<_> = self.loaders.iter().map(|l| l.kind()).collect();
        f.debug_struct("CachedLoader")
            .field("loaders", &kinds)
            .field("cached", &self.cache_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LocMemLoader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps a loader and counts how often it is asked for contents.
    struct Counting {
        inner: LocMemLoader,
        calls: Arc<AtomicUsize>,
    }

    impl Loader for Counting {
        fn kind(&self) -> &'static str {
            "counting"
        }

        fn get_template_sources(
            &self,
            template_name: &str,
            dirs: Option<&[PathBuf]>,
        ) -> Vec<Origin> {
            self.inner
                .get_template_sources(template_name, dirs)
                .into_iter()
                .map(|mut origin| {
                    origin.loader = self.kind();
                    origin
                })
                .collect()
        }

        fn get_contents(&self, origin: &Origin) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.get_contents(origin)
        }
    }

    fn counting(templates: &[(&str, &str)]) -> (CachedLoader, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let inner = Counting {
            inner: LocMemLoader::new(templates.iter().copied()),
            calls: Arc::clone(&calls),
        };
        (CachedLoader::new(vec![Box::new(inner)]), calls)
    }

    #[test]
    fn hit_does_not_reach_wrapped_loaders() {
        let (loader, calls) = counting(&[("a.html", "A")]);
        assert_eq!(loader.load_template("a.html", None).unwrap().contents, "A");
        assert_eq!(loader.load_template("a.html", None).unwrap().contents, "A");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn miss_is_cached_as_missing() {
        let (loader, calls) = counting(&[]);
        assert!(loader.cache_entry("missing.html").is_none());

        let err = loader.load_template("missing.html", None).unwrap_err();
        assert!(err.is_does_not_exist());
        assert_eq!(loader.cache_entry("missing.html"), Some(CacheEntry::Missing));

        let err = loader.load_template("missing.html", None).unwrap_err();
        assert!(err.is_does_not_exist());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_forgets_everything() {
        let (loader, calls) = counting(&[("a.html", "A")]);
        loader.load_template("a.html", None).unwrap();
        loader.load_template("b.html", None).unwrap_err();
        assert_eq!(loader.cache_len(), 2);

        loader.reset();
        assert_eq!(loader.cache_len(), 0);
        loader.load_template("a.html", None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn cache_key_depends_on_dirs() {
        let first = vec![PathBuf::from("/t/first")];
        let second = vec![PathBuf::from("/t/second")];
        let bare = CachedLoader::cache_key("test.html", None);
        assert_eq!(bare, CacheKey::from("test.html"));
        assert_eq!(bare.to_string(), "test.html");
        assert_eq!(CachedLoader::cache_key("test.html", Some(&[])), bare);

        let a = CachedLoader::cache_key("test.html", Some(&first));
        let b = CachedLoader::cache_key("test.html", Some(&second));
        assert_ne!(a, b);
        assert_ne!(a, bare);
        assert!(a.has_dirs());
        assert_eq!(a.template_name(), "test.html");
        assert_eq!(a, CachedLoader::cache_key("test.html", Some(&first)));
    }

    #[test]
    fn keys_with_dirs_never_match_a_plain_name() {
        let (loader, _) = counting(&[("a.html", "A")]);
        let dirs = vec![PathBuf::from("/other")];
        let key = CachedLoader::cache_key("a.html", Some(&dirs));
        loader.load_template("a.html", Some(&dirs)).unwrap();

        let lookalike = key.to_string();
        let err = loader.load_template(&lookalike, None).unwrap_err();
        assert!(err.is_does_not_exist());
        assert!(loader.cache_entry(key).is_some_and(|entry| !entry.is_missing()));
        assert!(loader.cache_entry(lookalike.as_str()).unwrap().is_missing());
    }

    #[test]
    fn first_wrapped_loader_wins() {
        let loader = CachedLoader::new(vec![
            Box::new(LocMemLoader::new([("foo.html", "first")])),
            Box::new(LocMemLoader::new([("foo.html", "second"), ("bar.html", "bar")])),
        ]);
        assert_eq!(loader.find_template("foo.html", None).unwrap().contents, "first");
        assert_eq!(loader.find_template("bar.html", None).unwrap().contents, "bar");
    }

    #[test]
    fn tried_origins_cover_every_wrapped_loader() {
        let loader = CachedLoader::new(vec![
            Box::new(LocMemLoader::new([("a.html", "a")])),
            Box::new(LocMemLoader::new([("b.html", "b")])),
        ]);
        let err = loader.find_template("c.html", None).unwrap_err();
        assert_eq!(err.tried().len(), 2);
        assert_eq!(loader.get_template_sources("c.html", None).len(), 2);
    }
}
