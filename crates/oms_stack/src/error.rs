use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while synthesizing or writing the deployment template.
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("invalid deployment context: {0}")]
    InvalidContext(String),

    #[error("asset directory '{}' does not exist or is not a directory", .0.display())]
    MissingAssetDirectory(PathBuf),

    /// The Glue job reads its script from a fixed key inside the data bucket;
    /// the uploaded asset directory has to provide it.
    #[error("asset directory '{}' has no '{key}' for the Glue job", .dir.display())]
    MissingJobScript { dir: PathBuf, key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to stage asset archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, SynthError>;
