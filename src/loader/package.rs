use crate::config::InstalledApp;
use crate::constants::{loader_kinds, PACKAGE_RESOURCE_PREFIX};
use crate::error::{Error, Result};
use crate::loader::interface::{Loader, Origin};
use crate::package::PackageRegistry;
use log::trace;
use std::path::PathBuf;

/// Loader for templates bundled as packaged resources of installed apps.
///
/// For every installed app that has a registered package, the resource
/// `templates/<name>` is looked up. Packages registered for apps that are not
/// installed are never consulted.
#[derive(Debug, Clone)]
pub struct PackageLoader {
    apps: Vec<String>,
    packages: PackageRegistry,
}

impl PackageLoader {
    pub fn new(apps: &[InstalledApp], packages: PackageRegistry) -> Self {
        let apps = apps.iter().map(|app| app.name.clone()).collect();
        Self { apps, packages }
    }
}

/// Display name of a packaged template: `egg:<app>:templates/<name>`.
fn display_name(app: &str, resource: &str) -> String {
    format!("egg:{app}:{resource}")
}

impl Loader for PackageLoader {
    fn kind(&self) -> &'static str {
        loader_kinds::PACKAGE
    }

    fn get_template_sources(
        &self,
        template_name: &str,
        _dirs: Option<&[PathBuf]>,
    ) -> Vec<Origin> {
        let resource = format!("{PACKAGE_RESOURCE_PREFIX}/{template_name}");
        self.apps
            .iter()
            .filter(|app| self.packages.contains(app))
            .map(|app| {
                Origin::new(display_name(app, &resource), template_name, self.kind())
            })
            .collect()
    }

    fn get_contents(&self, origin: &Origin) -> Result<String> {
        let missing = || Error::does_not_exist(&origin.template_name, vec![origin.clone()]);
        // origin.name is egg:<app>:<resource>; app names never contain ':'
        let Some((app, resource)) = origin
            .name
            .strip_prefix("egg:")
            .and_then(|rest| rest.split_once(':'))
        else {
            return Err(missing());
        };
        let Some(provider) = self.packages.get(app) else {
            return Err(missing());
        };
        if !provider.has_resource(resource) {
            trace!("package '{app}' has no resource '{resource}'");
            return Err(missing());
        }
        let bytes = provider.read_resource(resource)?;
        String::from_utf8(bytes)
            .map_err(|_| Error::InvalidEncoding { origin: origin.name.clone() })
    }
}
