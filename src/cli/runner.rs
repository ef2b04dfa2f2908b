use crate::{
    cli::{Commands, EngineArgs, FindArgs, RenderArgs},
    config::{Config, EngineConfig},
    constants::STDIN_INDICATOR,
    engine::Engines,
    error::{Error, Result},
};
use log::{debug, info};
use serde_json::{Map, Value};
use std::io::{Read, Write};
use std::path::PathBuf;

/// Runs one CLI command, writing its output to `out`.
pub fn run(command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Render(args) => render(args, out),
        Commands::Find(args) => find(args, out),
        Commands::List(args) => list(args, out),
    }
}

/// Builds the engines from `--config`, or a single default engine over `--dir`s.
pub fn load_engines(args: &EngineArgs) -> Result<Engines> {
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            debug!("No configuration given, searching {:?}.", args.dirs);
            Config::new(vec![EngineConfig::with_dirs(args.dirs.iter().cloned())])
        }
    };
    Engines::from_config(&config, &config.packages()?)
}

fn render(args: RenderArgs, out: &mut impl Write) -> Result<()> {
    let engines = load_engines(&args.engine)?;
    let vars = match args.context.as_deref() {
        Some(STDIN_INDICATOR) => Some(parse_vars(&read_from(std::io::stdin())?)?),
        Some(json) => Some(parse_vars(json)?),
        None => None,
    };
    let dirs = override_dirs(&args.override_dirs);
    let rendered = engines.render_to_string(args.names, vars.as_ref(), dirs)?;
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

fn find(args: FindArgs, out: &mut impl Write) -> Result<()> {
    let engines = load_engines(&args.engine)?;
    let dirs = override_dirs(&args.override_dirs);
    let template = engines.get_template(&args.name, dirs)?;
    info!("'{}' found by engine '{}'.", args.name, template.engine().name());
    writeln!(out, "{}", template.origin())?;
    Ok(())
}

fn list(args: EngineArgs, out: &mut impl Write) -> Result<()> {
    let engines = load_engines(&args)?;
    for engine in engines.all() {
        for name in engine.list_templates() {
            writeln!(out, "{}\t{name}", engine.name())?;
        }
    }
    Ok(())
}

fn override_dirs(dirs: &[PathBuf]) -> Option<&[PathBuf]> {
    (!dirs.is_empty()).then_some(dirs)
}

fn parse_vars(json: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(json)? {
        Value::Object(vars) => Ok(vars),
        _ => Err(Error::Other(anyhow::anyhow!("--context must be a JSON object"))),
    }
}

fn read_from(mut reader: impl Read) -> Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(buf)
}
