use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::polynomials::{self, DEFAULT_POLYNOMIAL};
use crate::split::DEFAULT_RANDOM_ATTEMPTS;

/// Configuration file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "shamir.toml";

/// Prefix of environment overrides, e.g. `SHAMIR_PRIMITIVE_POLYNOMIAL=0x12b`.
pub const ENV_PREFIX: &str = "SHAMIR";

/// Settings for the command-line tool.
///
/// # Fields
///
/// * `primitive_polynomial` - Polynomial used when `--primitive` is not given. Written as a hex
///   string (`"0x11d"`) or an integer.
/// * `random_retries` - Attempts at the secure random source before failing.
/// * `output_directory` - Where share files and recovered secrets are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShamirConfig {
    #[serde(
        serialize_with = "serialize_polynomial",
        deserialize_with = "deserialize_polynomial"
    )]
    pub primitive_polynomial: u32,
    pub random_retries: u32,
    pub output_directory: PathBuf,
}

impl Default for ShamirConfig {
    fn default() -> Self {
        ShamirConfig {
            primitive_polynomial: DEFAULT_POLYNOMIAL,
            random_retries: DEFAULT_RANDOM_ATTEMPTS,
            output_directory: PathBuf::from("."),
        }
    }
}

impl ShamirConfig {
    /// Loads the configuration file (optional unless `path` is given) and applies environment
    /// overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ShamirConfig = settings.try_deserialize()?;
        config.validate()?;
        debug!("📝 Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        polynomials::validate(self.primitive_polynomial)
            .map_err(|err| ConfigError::Message(err.to_string()))?;
        if self.random_retries == 0 {
            return Err(ConfigError::Message(
                "random_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Writes the default configuration as TOML, refusing to overwrite an existing file.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::Message(format!(
                "{} already exists",
                path.display()
            )));
        }

        let toml = toml::to_string_pretty(&ShamirConfig::default())
            .map_err(|err| ConfigError::Foreign(Box::new(err)))?;
        fs::write(path, toml).map_err(|err| ConfigError::Foreign(Box::new(err)))?;
        Ok(())
    }
}

fn serialize_polynomial<S>(polynomial: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("0x{polynomial:x}"))
}

fn deserialize_polynomial<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u32),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(polynomial) => Ok(polynomial),
        Repr::Text(text) => polynomials::parse(&text).map_err(serde::de::Error::custom),
    }
}
