//! Error types for BOM generation.

use thiserror::Error;

use crate::npm::RunFailure;

/// A failure that aborts the whole build.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BuildError {
    /// `npm ls` exited unsuccessfully and errors are not ignored.
    #[error("npm-ls exited with errors: {status} {signal}")]
    NpmLs {
        status: String,
        signal: String,
        #[source]
        source: RunFailure,
    },

    /// The output of `npm ls` is not a JSON object.
    #[error("failed to parse npm-ls response")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

impl BuildError {
    pub(crate) fn npm_ls(failure: RunFailure) -> Self {
        Self::NpmLs {
            status: failure
                .status
                .map_or_else(|| "noStatus".to_string(), |s| s.to_string()),
            signal: failure
                .signal
                .map_or_else(|| "noSignal".to_string(), |s| s.to_string()),
            source: failure,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
