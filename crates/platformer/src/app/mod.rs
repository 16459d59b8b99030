mod bootstrap;
mod canvas;
mod level;
mod loop_runner;
mod mario;

use thiserror::Error;
use tilecore::{ConfigError, MapFileError, MapTileError, StateError};

pub(crate) use bootstrap::{init_tracing, Settings};
pub(crate) use loop_runner::run;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{var} must be a tick count, got '{value}'")]
    InvalidTicks { var: &'static str, value: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Level(#[from] MapTileError),
    #[error(transparent)]
    LevelFile(#[from] MapFileError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("player entity {key} left the world")]
    MissingPlayer { key: u32 },
}
