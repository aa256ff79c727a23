use std::path::PathBuf;

pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a syntax tree: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} already exists")]
    AlreadyInitialised { path: PathBuf },

    #[error(transparent)]
    Semantic(#[from] toy_semantic::SemanticError),
}
