// src/error.rs
//! Error types for testbench runs

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::kernels::KernelError;
use crate::stream::ChannelError;
use crate::validation::MismatchReport;

/// Result type for testbench operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Errors that terminate a testbench run
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A corpus row carries fewer values than the kernel interface needs
    #[error("Malformed {source_name} row {row}: expected at least {expected} values, got {actual}")]
    MalformedRow {
        source_name: String,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Kernel output differs from the golden prediction
    #[error("Comparison mismatch: {0}")]
    ComparisonMismatch(MismatchReport),

    /// Failure raised by the kernel under test
    #[error("Kernel invocation failed: {0}")]
    Kernel(#[from] KernelError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

impl HarnessError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }
}
