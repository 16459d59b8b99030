use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use super::AppError;

pub(crate) const CONFIG_ENV_VAR: &str = "PLATFORMER_CONFIG";
pub(crate) const TICKS_ENV_VAR: &str = "PLATFORMER_TICKS";
pub(crate) const LEVEL_ENV_VAR: &str = "PLATFORMER_LEVEL";
const DEFAULT_TICKS: u32 = 600;

/// Startup knobs read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) level_path: Option<PathBuf>,
    pub(crate) ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: None,
            level_path: None,
            ticks: DEFAULT_TICKS,
        }
    }
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| {
            lookup(var)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let ticks = match non_empty(TICKS_ENV_VAR) {
            Some(raw) => raw.parse::<u32>().map_err(|_| AppError::InvalidTicks {
                var: TICKS_ENV_VAR,
                value: raw,
            })?,
            None => DEFAULT_TICKS,
        };

        Ok(Self {
            config_path: non_empty(CONFIG_ENV_VAR).map(PathBuf::from),
            level_path: non_empty(LEVEL_ENV_VAR).map(PathBuf::from),
            ticks,
        })
    }
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
