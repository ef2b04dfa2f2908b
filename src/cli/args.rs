use crate::constants::verbosity;
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

/// Resolve and render templates through configured loader chains.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render the first existing template to stdout.
    Render(RenderArgs),
    /// Print where a template would be loaded from.
    Find(FindArgs),
    /// List the templates found under every engine's directories.
    List(EngineArgs),
}

impl Commands {
    pub fn verbose(&self) -> u8 {
        match self {
            Commands::Render(args) => args.engine.verbose,
            Commands::Find(args) => args.engine.verbose,
            Commands::List(args) => args.verbose,
        }
    }
}

/// Options describing which engines to use.
#[derive(ClapArgs, Debug, Clone)]
pub struct EngineArgs {
    /// Configuration file, or a directory holding `stencil.{json,yaml,yml}`.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Template directory; repeat to search several. Used when no config is given.
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RenderArgs {
    /// Candidate template names; the first one found is rendered.
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// Template variables as a JSON object, or `-` to read them from stdin.
    #[arg(long, value_name = "JSON")]
    pub context: Option<String>,

    /// Override the search directories for this lookup only.
    #[arg(long = "override-dir", value_name = "DIR")]
    pub override_dirs: Vec<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FindArgs {
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Override the search directories for this lookup only.
    #[arg(long = "override-dir", value_name = "DIR")]
    pub override_dirs: Vec<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Error,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_verbose_flags_to_log_filters() {
        assert_eq!(get_log_level_from_verbose(verbosity::OFF), LevelFilter::Error);
        assert_eq!(get_log_level_from_verbose(verbosity::INFO), LevelFilter::Info);
        assert_eq!(get_log_level_from_verbose(verbosity::DEBUG), LevelFilter::Debug);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE), LevelFilter::Trace);
        assert_eq!(get_log_level_from_verbose(verbosity::TRACE + 1), LevelFilter::Trace);
    }

    #[test]
    fn parses_render() {
        let cli = Cli::parse_from([
            "stencil",
            "render",
            "missing.html",
            "index.html",
            "--dir",
            "templates",
            "-d",
            "more",
            "--context",
            r#"{"obj": 1}"#,
            "-vv",
        ]);
        let Commands::Render(args) = cli.command else { panic!("expected render") };
        assert_eq!(args.names, vec!["missing.html", "index.html"]);
        assert_eq!(args.engine.dirs, vec![PathBuf::from("templates"), PathBuf::from("more")]);
        assert_eq!(args.context.as_deref(), Some(r#"{"obj": 1}"#));
        assert_eq!(args.engine.verbose, 2);
        assert!(args.engine.config.is_none());
    }

    #[test]
    fn render_requires_a_name() {
        assert!(Cli::try_parse_from(["stencil", "render"]).is_err());
    }

    #[test]
    fn parses_find_and_list() {
        let cli = Cli::parse_from(["stencil", "find", "a.html", "--override-dir", "x"]);
        let Commands::Find(args) = cli.command else { panic!("expected find") };
        assert_eq!(args.name, "a.html");
        assert_eq!(args.override_dirs, vec![PathBuf::from("x")]);

        let cli = Cli::parse_from(["stencil", "list", "--config", "stencil.yaml", "-v"]);
        assert_eq!(cli.command.verbose(), 1);
        let Commands::List(args) = cli.command else { panic!("expected list") };
        assert_eq!(args.config, Some(PathBuf::from("stencil.yaml")));
    }
}
