use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("authentication failure: cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("authentication failure: {path} is corrupt: {message}")]
    Corrupt { path: String, message: String },

    #[error("authentication failure: cannot persist identity to {path}: {message}")]
    Write { path: String, message: String },
}

/// Anonymous identity namespacing every stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub user_id: Uuid,
}

impl AppState {
    pub fn load_or_create() -> Result<Self, IdentityError> {
        Self::load_or_create_at(&Self::path())
    }

    pub fn load_or_create_at(path: &Path) -> Result<Self, IdentityError> {
        let display = path.display().to_string();

        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| IdentityError::Corrupt {
                path: display,
                message: e.to_string(),
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                let state = Self {
                    user_id: Uuid::new_v4(),
                };
                state.save_at(path)?;
                Ok(state)
            }
            Err(source) => Err(IdentityError::Read {
                path: display,
                source,
            }),
        }
    }

    fn save_at(&self, path: &Path) -> Result<(), IdentityError> {
        let write_error = |message: String| IdentityError::Write {
            path: path.display().to_string(),
            message,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| write_error(e.to_string()))
    }

    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("miqat")
            .join("state.toml")
    }
}
