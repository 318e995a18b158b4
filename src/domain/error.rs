// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Every failure is fatal to the run. There is no partial-success
// mode: a train/dev/test split missing a class would silently
// corrupt whatever trains on it.

use std::io;

use thiserror::Error;

/// Error type for cleaning, splitting and artifact persistence.
#[derive(Debug, Error)]
pub enum PrepError {
    /// One or more required columns are absent from the input header.
    #[error("input is missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A filtering stage left no records behind.
    #[error("no records survived the '{stage}' stage")]
    EmptyInput { stage: &'static str },

    /// A class cannot supply the rows its quota demands.
    #[error(
        "label {label} ('{category}') needs {required} rows but only has {available} \
         (short by {})",
        .required - .available
    )]
    InsufficientSamples {
        label: u32,
        category: String,
        required: usize,
        available: usize,
    },

    /// The external tokenizer failed on some input.
    #[error("tokenizer failure: {0}")]
    Tokenizer(String),

    /// Rejected configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
