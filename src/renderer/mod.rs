//! MiniJinja integration: environments that resolve includes through an engine.

pub mod minijinja;

pub use self::minijinja::{base_environment, build_environment};
