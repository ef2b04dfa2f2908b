use crate::config::EngineConfig;
use crate::engine::Engine;
use log::trace;
use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use std::fmt::Write;
use std::path::PathBuf;

/// Builds the MiniJinja environment a template of `engine` renders in.
///
/// `{% include %}` and `{% extends %}` resolve through the engine's loader
/// chain, scoped to the same directory override as the including template.
pub fn build_environment(engine: &Engine, dirs: Option<Vec<PathBuf>>) -> Environment<'static> {
    let mut env = base_environment(engine.config());

    let engine = engine.clone();
    env.set_loader(move |name| {
        trace!("resolving '{name}' for include");
        match engine.find_template(name, dirs.as_deref()) {
            Ok(source) => Ok(Some(source.contents)),
            Err(err) if err.is_does_not_exist() => Ok(None),
            Err(err) => Err(minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to load template '{name}'"),
            )
            .with_source(err)),
        }
    });
    env
}

/// Environment with the engine's rendering settings and no loader attached.
pub fn base_environment(config: &EngineConfig) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);

    if config.debug {
        env.set_undefined_behavior(UndefinedBehavior::Strict);
    } else if !config.string_if_invalid.is_empty() {
        let invalid = config.string_if_invalid.clone();
        env.set_formatter(move |out, state, value| {
            if value.is_undefined() {
                return out.write_str(&invalid).map_err(|_| {
                    minijinja::Error::new(ErrorKind::WriteFailure, "failed to write output")
                });
            }
            minijinja::escape_formatter(out, state, value)
        });
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(config: &EngineConfig, source: &str) -> Result<String, minijinja::Error> {
        let env = base_environment(config);
        env.render_str(source, json!({ "obj": "x" }))
    }

    #[test]
    fn keeps_trailing_newline() {
        let rendered = render(&EngineConfig::default(), "obj:{{ obj }}\n").unwrap();
        assert_eq!(rendered, "obj:x\n");
    }

    #[test]
    fn undefined_renders_empty_by_default() {
        let rendered = render(&EngineConfig::default(), "[{{ missing }}]").unwrap();
        assert_eq!(rendered, "[]");
    }

    #[test]
    fn undefined_renders_string_if_invalid() {
        let config =
            EngineConfig { string_if_invalid: "INVALID".into(), ..Default::default() };
        assert_eq!(render(&config, "[{{ missing }}|{{ obj }}]").unwrap(), "[INVALID|x]");
    }

    #[test]
    fn undefined_is_an_error_in_debug() {
        let config = EngineConfig { debug: true, ..Default::default() };
        assert!(render(&config, "{{ missing }}").is_err());
    }
}
