// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types and traits describing the corpus:
//
//   record.rs  — one news article, raw and cleaned
//   corpus.rs  — an ordered set of cleaned records plus the
//                label → category mapping they share
//   traits.rs  — the seams to the outside world (where raw
//                records come from, how tokens are counted)
//   error.rs   — the typed failure taxonomy of a run
//
// Rules for this layer:
//   - NO file formats (CSV, JSON files) here
//   - NO tokenizer implementations here
//   - Only structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Raw and cleaned news records
pub mod record;

/// Corpus, label map and token-length band
pub mod corpus;

/// Abstractions implemented by the data and infra layers
pub mod traits;

/// Typed errors for every pipeline stage
pub mod error;
