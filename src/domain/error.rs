// ============================================================
// Layer 3 — Dataset Errors
// ============================================================
// Every failure the data pipeline can surface. All of them are
// fatal: nothing in this crate retries or skips a bad file.
//
// Only the training-split source file is checked before reading.
// A missing dev/test/target file shows up as `Io`, not `MissingFile`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::corpus::Split;

pub type Result<T> = std::result::Result<T, DatasetError>;

#[derive(Error, Debug)]
pub enum DatasetError {
    /// The training-split source file is absent.
    #[error("File {} not exist", .0.display())]
    MissingFile(PathBuf),

    #[error("Cannot read '{}': {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{split} split is misaligned: {source_lines} source lines vs {target_lines} target lines")]
    Misaligned {
        split:        Split,
        source_lines: usize,
        target_lines: usize,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Tokenizer error: {0}")]
    Tokenize(String),
}
