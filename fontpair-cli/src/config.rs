//! Loading analysis parameters from TOML.

use std::path::{Path, PathBuf};

use fontpair::{Params, ParamsError};
use thiserror::Error;

/// A configuration file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid config '{path}': {source}")]
    Params { path: PathBuf, source: ParamsError },
}

/// Reads and validates the parameters in the TOML file at `path`.
pub fn load(path: &Path) -> Result<Params, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    let params = parse(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })?;
    params.validate().map_err(|source| ConfigError::Params {
        path: path.to_owned(),
        source,
    })?;
    Ok(params)
}

fn parse(contents: &str) -> Result<Params, toml::de::Error> {
    toml::from_str(contents)
}
