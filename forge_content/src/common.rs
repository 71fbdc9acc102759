use std::{io, path::Path, path::PathBuf, result};

use forge_shared::thiserror;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IoError: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed data: {0}")]
    Format(String),
    #[error("Unrecognized version {found} (current version is {current})")]
    Version { found: u32, current: u32 },
    #[error("Invalid metadata: {0}")]
    Validation(String),
    #[error("Value '{value}' of setting '{key}' cannot be parsed")]
    Parse { key: String, value: String },
    #[error("Invalid path: {0:?}")]
    InvalidPath(PathBuf),
    #[error("Extension already registered: {0}")]
    ExtensionAlreadyRegistered(String),
    #[error("Extension not registered: {0}")]
    ExtensionNotRegistered(String),
}

pub(crate) fn extract_extension_from_path(path: &Path) -> Result<String> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_lowercase())
        .ok_or_else(|| Error::InvalidPath(path.to_owned()))
}
