use std::fmt;
use std::io::Error;

/// Variable holding the name of the environment the replication runs in.
const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";

const PROD: &str = "prod";
const STAGING: &str = "staging";
const DEV: &str = "dev";

/// Environment a replication process runs in.
///
/// Selects the environment specific configuration file and the logging
/// output (pretty terminal output in dev, JSON files otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Prod,
    Staging,
    Dev,
}

impl Environment {
    /// Reads the environment from `APP_ENVIRONMENT`, falling back to [`Environment::Prod`].
    pub fn load() -> Result<Environment, Error> {
        match std::env::var(ENVIRONMENT_VAR) {
            Ok(value) => value.try_into(),
            Err(_) => Ok(Environment::Prod),
        }
    }

    /// Exports this environment through `APP_ENVIRONMENT`.
    pub fn set(&self) {
        // Only called during process or test setup, before other threads read the variable.
        unsafe { std::env::set_var(ENVIRONMENT_VAR, self.to_string()) }
    }

    /// Returns `true` for environments that log to files instead of the terminal.
    pub fn is_prod(&self) -> bool {
        matches!(self, Environment::Prod | Environment::Staging)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Prod => PROD,
            Environment::Staging => STAGING,
            Environment::Dev => DEV,
        };

        f.write_str(name)
    }
}

impl TryFrom<String> for Environment {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            PROD => Ok(Environment::Prod),
            STAGING => Ok(Environment::Staging),
            DEV => Ok(Environment::Dev),
            other => Err(Error::other(format!(
                "unsupported environment `{other}`, expected one of `{PROD}`, `{STAGING}` or `{DEV}`"
            ))),
        }
    }
}
