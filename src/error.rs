use crate::loader::Origin;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    /// No configured loader (or cache entry) could resolve the name.
    #[error("Template '{name}' does not exist.")]
    TemplateDoesNotExist { name: String, tried: Vec<Origin> },

    /// `select_template` and `render_to_string` were given an empty list.
    #[error("No template names provided")]
    NoTemplateNames,

    #[error("Template '{name}' has invalid syntax. Original error: {source}")]
    TemplateSyntaxError {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to render. Original error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Template source '{origin}' is not valid UTF-8.")]
    InvalidEncoding { origin: String },

    #[error("Failed to parse config file. Original error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Failed to parse config file. Original error: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    #[error("No configuration file found in '{config_dir}'. Tried: {config_files}.")]
    ConfigNotFound { config_dir: String, config_files: String },

    #[error("Configuration error: {0}.")]
    ConfigValidation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Builds a "does not exist" error for `name` with the origins that were tried.
    pub fn does_not_exist(name: impl Into<String>, tried: Vec<Origin>) -> Self {
        Error::TemplateDoesNotExist { name: name.into(), tried }
    }

    /// Whether this error means "no template by that name", as opposed to a
    /// failure while reading or compiling one.
    pub fn is_does_not_exist(&self) -> bool {
        matches!(self, Error::TemplateDoesNotExist { .. } | Error::NoTemplateNames)
    }

    /// Origins that were tried before giving up. Empty for every other error.
    pub fn tried(&self) -> &[Origin] {
        match self {
            Error::TemplateDoesNotExist { tried, .. } => tried,
            _ => &[],
        }
    }
}

/// Convenience type alias for Results with the crate error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{err}");
    for origin in err.tried() {
        eprintln!("  tried: {origin}");
    }
    std::process::exit(crate::constants::exit_codes::FAILURE);
}
