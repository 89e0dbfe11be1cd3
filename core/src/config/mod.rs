pub mod cli;

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use derive_more::Display;
use serde::Deserialize;
use thiserror::Error;

use crate::config::cli::Cli;

pub const ENV_PAYLOAD: &str = "HANDOFF_PAYLOAD";
pub const ENV_ENTRY: &str = "HANDOFF_ENTRY";

const CONFIG_FILE: &str = "handoff.toml";

/// Resolved bootstrap configuration. Precedence, lowest to highest:
/// built-in defaults, config file, `HANDOFF_*` environment, CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub payload: PathBuf,
    pub entry_symbol: Box<str>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    payload: Option<PathBuf>,
    entry: Option<Box<str>>,
}

#[derive(Debug, Default)]
struct EnvOverrides {
    payload: Option<PathBuf>,
    entry: Option<Box<str>>,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match config_file_path(cli) {
            Some((path, required)) => FileConfig::read(&path, required)?,
            None => FileConfig::default(),
        };
        let env = EnvOverrides::collect(env::vars());
        Ok(Self::layer(cli, env, file))
    }

    fn layer(cli: &Cli, env: EnvOverrides, file: FileConfig) -> Self {
        let payload = cli
            .payload
            .clone()
            .or(env.payload)
            .or(file.payload)
            .unwrap_or_else(default_payload_path);
        let entry_symbol = cli
            .entry
            .as_deref()
            .map(Box::from)
            .or(env.entry)
            .or(file.entry)
            .unwrap_or_else(|| Box::from(handoff_api::DEFAULT_ENTRY_SYMBOL));
        Self {
            payload,
            entry_symbol,
        }
    }
}

impl FileConfig {
    /// A missing file at the default location is no configuration at all;
    /// a missing file the user pointed at explicitly is an error.
    fn read(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
                return Ok(Self::default());
            }
            Err(err) => return Err(ConfigError::Read(err)),
        };
        Ok(toml::from_str(&raw)?)
    }
}

impl EnvOverrides {
    fn collect(vars: impl Iterator<Item = (String, String)>) -> Self {
        vars.fold(Self::default(), |mut overrides, (key, value)| {
            match key.as_str() {
                ENV_PAYLOAD => overrides.payload = Some(PathBuf::from(value)),
                ENV_ENTRY => overrides.entry = Some(value.into()),
                _ => {}
            }
            overrides
        })
    }
}

fn config_file_path(cli: &Cli) -> Option<(PathBuf, bool)> {
    if let Some(path) = &cli.config {
        return Some((path.clone(), true));
    }
    dirs::config_dir().map(|dir| (dir.join("handoff").join(CONFIG_FILE), false))
}

fn default_payload_path() -> PathBuf {
    PathBuf::from(format!("payload.{}", env::consts::DLL_EXTENSION))
}

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    Read(#[from] io::Error),
    Parse(#[from] toml::de::Error),
}
