use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to encode archive entry '{name}': {source}")]
    Entry {
        name: String,
        source: zip::result::ZipError,
    },

    #[error("failed to finalize archive: {source}")]
    Finalize { source: zip::result::ZipError },

    #[error("failed to write '{path}': {source}")]
    Deliver { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;
