use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required flag: at least one --file <path> must be provided")]
    NoFiles,

    #[error("duplicate file: {}", path.display())]
    DuplicateFile { path: PathBuf },

    #[error("interval must be greater than zero")]
    ZeroInterval,
}
