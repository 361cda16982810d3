//! Tool configuration.
//!
//! # Responsibility
//! - Merge built-in defaults, an optional TOML file and `EXPGEN_*`
//!   environment variables into one [`ExpgenConfig`].
//!
//! # Invariants
//! - Later layers win: defaults < TOML file < environment.
//! - Nested keys use `__` in environment names (`EXPGEN_LOG__LEVEL`).

use crate::generator::{GeneratorOptions, ImportMode, DEFAULT_LOCAL_IMPORTS_DIR};
use crate::logging::default_log_level;
use crate::parser::ParseConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "expgen.toml";
pub const ENV_PREFIX: &str = "EXPGEN_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// `trace|debug|info|warn|error|off`.
    pub level: String,
    /// Rolling log files go here; stderr when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpgenConfig {
    pub import_mode: ImportMode,
    pub local_imports_dir: String,
    pub instructions_mandatory: bool,
    pub log: LogSettings,
}

impl Default for ExpgenConfig {
    fn default() -> Self {
        Self {
            import_mode: ImportMode::Cdn,
            local_imports_dir: DEFAULT_LOCAL_IMPORTS_DIR.to_string(),
            instructions_mandatory: false,
            log: LogSettings::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    MissingFile(PathBuf),
    Figment(Box<figment::Error>),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile(path) => {
                write!(f, "config file `{}` does not exist", path.display())
            }
            Self::Figment(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingFile(_) => None,
            Self::Figment(err) => Some(err.as_ref()),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Figment(Box::new(value))
    }
}

impl ExpgenConfig {
    /// Loads the layered configuration.
    ///
    /// With `path = None`, `expgen.toml` in the working directory is used
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if !path.exists() => return Err(ConfigError::MissingFile(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        Self::from_figment(
            Self::base_figment()
                .merge(Toml::file(file))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Defaults only; callers add their own layers on top.
    pub fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(ExpgenConfig::default()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// Loads defaults plus a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::from_figment(Self::base_figment().merge(Toml::string(text)))
    }

    pub fn parse_config(&self) -> ParseConfig {
        ParseConfig {
            instructions_mandatory: self.instructions_mandatory,
        }
    }

    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            import_mode: self.import_mode,
            local_imports_dir: self.local_imports_dir.clone(),
        }
    }
}
