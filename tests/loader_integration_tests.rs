use serde_json::{json, Map, Value};
use stencil::config::{EngineConfig, InstalledApp, LoaderSpec};
use stencil::loader::{AppDirectoriesLoader, CachedLoader, FilesystemLoader, Loader};
use stencil::{Engine, Engines, MemoryPackage, PackageRegistry};
use test_log::test;

mod utils;
use utils::fixture;

fn vars(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

fn egg_engine() -> Engine {
    let packages = PackageRegistry::new()
        .register("egg_empty", MemoryPackage::new())
        .register(
            "egg_1",
            MemoryPackage::new()
                .with_resource("templates/y.html", "y")
                .with_resource("templates/x.txt", "x"),
        )
        .clone();
    let config = EngineConfig {
        installed_apps: vec![InstalledApp::new("egg_empty"), InstalledApp::new("egg_1")],
        loaders: Some(vec![LoaderSpec::Eggs]),
        ..EngineConfig::default()
    };
    Engine::with_packages(config, packages).unwrap()
}

#[test]
fn egg_resource_is_loaded_with_display_name() {
    let engine = egg_engine();
    let template = engine.get_template("y.html").unwrap();
    assert_eq!(template.origin().name, "egg:egg_1:templates/y.html");
    assert_eq!(template.render_vars(None).unwrap(), "y");
}

#[test]
fn egg_missing_resource_does_not_exist() {
    let engine = egg_engine();
    let err = engine.get_template("not-existing.html").unwrap_err();
    assert!(err.is_does_not_exist());
}

#[test]
fn egg_in_uninstalled_app_does_not_exist() {
    let packages = PackageRegistry::new()
        .register("egg_1", MemoryPackage::new().with_resource("templates/y.html", "y"))
        .clone();
    let config = EngineConfig {
        installed_apps: vec![InstalledApp::new("egg_empty")],
        loaders: Some(vec![LoaderSpec::Eggs]),
        ..EngineConfig::default()
    };
    let engine = Engine::with_packages(config, packages).unwrap();
    assert!(engine.get_template("y.html").unwrap_err().is_does_not_exist());
}

#[test]
fn cached_loader_keys_by_dirs() {
    let loader = CachedLoader::new(vec![Box::new(FilesystemLoader::new([fixture(
        "templates",
    )]))]);
    let first = [fixture("templates/first")];
    let second = [fixture("templates/second")];

    let a = loader.load_template("test.html", Some(&first[..])).unwrap();
    let b = loader.load_template("test.html", Some(&second[..])).unwrap();
    assert_eq!(a.contents, "First template\n");
    assert_eq!(b.contents, "Second template\n");
    assert_eq!(loader.cache_len(), 2);
}

#[test]
fn cached_loader_remembers_missing_templates() {
    let loader = CachedLoader::new(vec![Box::new(FilesystemLoader::new([fixture(
        "templates",
    )]))]);
    assert!(loader.cache_entry("missing.html").is_none());

    let err = loader.find_template("missing.html", None).unwrap_err();
    assert!(err.is_does_not_exist());
    assert!(loader.cache_entry("missing.html").unwrap().is_missing());

    // A second lookup is answered from the cache with the same kind of error.
    let err = loader.find_template("missing.html", None).unwrap_err();
    assert!(err.is_does_not_exist());
}

#[test]
fn priority_without_cache() {
    let loaders: Vec<Box<dyn Loader>> = vec![
        Box::new(FilesystemLoader::new([fixture("global_templates")])),
        Box::new(AppDirectoriesLoader::new(&[InstalledApp::with_path(
            "priority_app",
            fixture("apps/priority_app"),
        )])),
    ];
    let engine = Engine::with_loaders(EngineConfig::default(), loaders).unwrap();
    let template = engine.get_template("priority/foo.html").unwrap();
    assert_eq!(template.render_vars(None).unwrap(), "priority\n");
}

#[test]
fn priority_with_cache() {
    let config = EngineConfig {
        dirs: vec![fixture("global_templates")],
        installed_apps: vec![InstalledApp::with_path(
            "priority_app",
            fixture("apps/priority_app"),
        )],
        loaders: Some(vec![LoaderSpec::Cached(vec![
            LoaderSpec::Filesystem,
            LoaderSpec::AppDirectories,
        ])]),
        ..EngineConfig::default()
    };
    let engine = Engine::new(config).unwrap();
    let template = engine.get_template("priority/foo.html").unwrap();
    assert_eq!(template.render_vars(None).unwrap(), "priority\n");
}

#[test]
fn app_templates_include_each_other() {
    let config = EngineConfig {
        app_dirs: true,
        installed_apps: vec![InstalledApp::with_path("blog", fixture("apps/blog"))],
        ..EngineConfig::default()
    };
    let engines = Engines::new(vec![Engine::new(config).unwrap()]);
    let rendered = engines
        .render_to_string(
            "blog/post.html",
            Some(&vars(json!({"title": "Hello", "body": "text"}))),
            None,
        )
        .unwrap();
    assert_eq!(rendered, "[Hello]: text\n");
}
