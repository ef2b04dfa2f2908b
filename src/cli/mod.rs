pub mod args;
pub mod runner;

pub use args::{
    get_log_level_from_verbose, parse_cli, Cli, Commands, EngineArgs, FindArgs, RenderArgs,
};
pub use runner::{load_engines, run};
