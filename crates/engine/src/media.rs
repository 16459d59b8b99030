use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const RESOURCES_ENV_VAR: &str = "TILECORE_RESOURCES";
const RESOURCES_DIR_NAME: &str = "resources";

/// Resource root handed to loaders. Built once by the application and passed
/// by reference; nothing in the engine reads a global root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Medias {
    resources_dir: PathBuf,
}

/// A resource addressed by a `/` separated path relative to [`Medias`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    path: String,
    file: PathBuf,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("{var} is set but is not a directory: {path}")]
    InvalidEnvRoot { var: &'static str, path: PathBuf },
    #[error(
        "could not find a 'resources' directory above {start_dir}; set {var} explicitly"
    )]
    RootNotFound {
        start_dir: PathBuf,
        var: &'static str,
    },
}

impl Medias {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
        }
    }

    /// Uses `TILECORE_RESOURCES` when set, otherwise the first `resources`
    /// directory found walking up from the executable.
    pub fn from_env() -> Result<Self, MediaError> {
        match env::var(RESOURCES_ENV_VAR) {
            Ok(value) => {
                let path = normalize_path(Path::new(&value));
                if path.is_dir() {
                    Ok(Self::new(path))
                } else {
                    Err(MediaError::InvalidEnvRoot {
                        var: RESOURCES_ENV_VAR,
                        path,
                    })
                }
            }
            Err(env::VarError::NotPresent) => {
                let exe = env::current_exe().map_err(MediaError::CurrentExe)?;
                let start_dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
                start_dir
                    .ancestors()
                    .map(|dir| dir.join(RESOURCES_DIR_NAME))
                    .find(|candidate| candidate.is_dir())
                    .map(|found| Self::new(normalize_path(&found)))
                    .ok_or(MediaError::RootNotFound {
                        start_dir,
                        var: RESOURCES_ENV_VAR,
                    })
            }
            Err(source) => Err(MediaError::EnvVar {
                var: RESOURCES_ENV_VAR,
                source,
            }),
        }
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    pub fn create(&self, parts: &[&str]) -> Media {
        let path = parts
            .iter()
            .flat_map(|part| part.split(['/', '\\']))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let file = path
            .split('/')
            .fold(self.resources_dir.clone(), |acc, segment| acc.join(segment));
        Media { path, file }
    }

    /// Resolves `name` next to `media` (same parent directory).
    pub fn sibling(&self, media: &Media, name: &str) -> Media {
        self.create(&[media.parent_path(), name])
    }
}

impl Media {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn parent_path(&self) -> &str {
        match self.path.rfind('/') {
            Some(index) => &self.path[..index],
            None => "",
        }
    }

    pub fn name(&self) -> &str {
        match self.path.rfind('/') {
            Some(index) => &self.path[index + 1..],
            None => &self.path,
        }
    }

    pub fn exists(&self) -> bool {
        self.file.exists()
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
