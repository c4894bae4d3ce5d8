use depot_db::DEFAULT_MAX_CONNECTIONS;
use depot_events::{FcmConfig, FcmConfigError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl From<FcmConfigError> for ConfigError {
    fn from(err: FcmConfigError) -> Self {
        match err {
            FcmConfigError::Missing(name) => ConfigError::Missing(name),
            FcmConfigError::Invalid { name, value } => ConfigError::Invalid {
                name,
                expected: "positive integer",
                value,
            },
        }
    }
}

/// Worker configuration loaded from environment variables.
///
/// | Env Var                    | Required | Default |
/// |----------------------------|----------|---------|
/// | `DATABASE_URL`             | yes      | —       |
/// | `DATABASE_MAX_CONNECTIONS` | no       | `10`    |
/// | `FCM_PROJECT_ID`           | yes      | —       |
/// | `FCM_ACCESS_TOKEN`         | yes      | —       |
///
/// The remaining `FCM_*` variables are documented on [`FcmConfig::from_env`].
/// Every numeric variable that is set must hold a positive integer; anything
/// else is rejected rather than replaced by the default.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub fcm: FcmConfig,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(value) => match value.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DATABASE_MAX_CONNECTIONS",
                        expected: "positive integer",
                        value,
                    })
                }
            },
        };

        let fcm = FcmConfig::from_lookup(&lookup)?;

        Ok(Self {
            database_url,
            max_connections,
            fcm,
        })
    }
}
