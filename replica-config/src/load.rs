use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::environment::Environment;

/// Directory, relative to the working directory, holding the configuration files.
const CONFIGURATION_DIR: &str = "configuration";

/// File loaded first for every environment.
const BASE_CONFIG_FILE: &str = "base.yaml";

/// Prefix of environment variables overriding file values.
const ENV_PREFIX: &str = "APP";

const ENV_PREFIX_SEPARATOR: &str = "_";

/// Separator for nested keys, `APP_LISTENER__SUBJECT` sets `listener.subject`.
const ENV_SEPARATOR: &str = "__";

/// Separator for list values, `APP_KEYS=a,b`.
const LIST_SEPARATOR: &str = ",";

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("failed to detect the environment: {0}")]
    Environment(#[source] std::io::Error),

    #[error("failed to build the configuration: {0}")]
    Build(#[from] config::ConfigError),
}

/// Declares which keys of a configuration are parsed as lists from environment variables.
pub trait Config {
    const LIST_PARSE_KEYS: &'static [&'static str];
}

/// Loads a configuration from `./configuration`.
///
/// Sources are layered in this order, later ones overriding earlier ones:
/// 1. `configuration/base.yaml`
/// 2. `configuration/{environment}.yaml`
/// 3. `APP_` prefixed environment variables
pub fn load_config<T>() -> Result<T, LoadError>
where
    T: Config + DeserializeOwned,
{
    let base_path = std::env::current_dir().map_err(LoadError::CurrentDir)?;
    let environment = Environment::load().map_err(LoadError::Environment)?;

    load_config_from(&base_path.join(CONFIGURATION_DIR), environment)
}

/// Loads a configuration from an explicit directory and environment.
pub fn load_config_from<T>(directory: &Path, environment: Environment) -> Result<T, LoadError>
where
    T: Config + DeserializeOwned,
{
    let mut environment_source = config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_PREFIX_SEPARATOR)
        .separator(ENV_SEPARATOR);

    if !T::LIST_PARSE_KEYS.is_empty() {
        environment_source = environment_source
            .try_parsing(true)
            .list_separator(LIST_SEPARATOR);

        for key in T::LIST_PARSE_KEYS {
            environment_source = environment_source.with_list_parse_key(key);
        }
    }

    let settings = config::Config::builder()
        .add_source(config::File::from(directory.join(BASE_CONFIG_FILE)))
        .add_source(config::File::from(
            directory.join(format!("{environment}.yaml")),
        ))
        .add_source(environment_source)
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
