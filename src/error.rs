use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid CSV in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("similarity list '{key}' in {} is not sorted by descending score", path.display())]
    UnorderedSimilarity { path: PathBuf, key: String },

    #[error("similarity key '{key}' appears more than once in {}", path.display())]
    DuplicateKey { path: PathBuf, key: String },

    #[error("data directory does not exist: {0}")]
    DataDir(PathBuf),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidRequest(&'static str),
}
