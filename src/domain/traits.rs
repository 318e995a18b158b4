// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two collaborators the core depends on but does not own:
//
//   RecordSource  — where raw rows come from
//                   (CsvLoader, or an in-memory Vec in tests)
//   TokenCounter  — how many tokens a piece of text costs
//                   (HuggingFace tokenizer, or whitespace words)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::error::PrepError;
use crate::domain::record::RawRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Anything that can produce the raw rows of a corpus.
///
/// Implementations must fail with `PrepError::Schema` when the
/// required columns are absent, before yielding any row.
pub trait RecordSource {
    fn load_all(&self) -> Result<Vec<RawRecord>, PrepError>;
}

/// Rows already in memory are a source too.
impl RecordSource for Vec<RawRecord> {
    fn load_all(&self) -> Result<Vec<RawRecord>, PrepError> {
        Ok(self.clone())
    }
}

// ─── TokenCounter ─────────────────────────────────────────────────────────────
/// Deterministic, side-effect-free `text → token count`.
///
/// Called from rayon workers, hence `Send + Sync`.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> Result<usize, PrepError>;
}
