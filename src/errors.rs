use crate::{config::CredentialsError, services::store::StorageError};
use std::{path::PathBuf, process::ExitCode};
use thiserror::Error;

/// Fatal errors that end the process with a one-line message.
#[derive(Debug, Error)]
pub enum AppError {
    /// Raised before any remote call is made.
    #[error("Unable to read key file: {}", path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: CredentialsError,
    },

    /// The bucket could not be resolved; no key was touched.
    #[error("{0}")]
    Bucket(StorageError),

    /// A write or delete failed mid-run; remaining keys were not processed.
    #[error("{0}")]
    Sync(StorageError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::Other(_) => ExitCode::from(1),
            // 2 is left to clap's usage errors
            AppError::Credentials { .. } => ExitCode::from(3),
            AppError::Bucket(_) => ExitCode::from(4),
            AppError::Sync(_) => ExitCode::from(5),
        }
    }
}
