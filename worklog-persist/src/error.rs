use std::path::Path;
use std::path::PathBuf;

/// Errors produced by session storage, import, and export.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("session {id} cannot be stored: {reason}")]
    Unencodable { id: uuid::Uuid, reason: String },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("session repository lock poisoned")]
    LockPoisoned,
}

impl PersistError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
