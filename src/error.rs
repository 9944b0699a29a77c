use std::io;

/// Failures of the storage and export plumbing around a drill.
///
/// The drill engine itself never fails; these only surface from the
/// milestone store, the config file, and summary exports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("milestone store error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("config serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no writable data directory available")]
    NoDataDir,

    #[error("milestone store lock poisoned")]
    StorePoisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
