// ============================================================
// Layer 5 — Infrastructure Layer
// ============================================================
// The external collaborators of the pipeline, behind the traits
// and types of the domain layer:
//
//   tokenizer_store.rs — token counting (HuggingFace tokenizer
//                        JSON, or a whitespace fallback)
//
//   corpus_store.rs    — CSV / JSON artifacts: cleaned corpus,
//                        label map, partitions, run config
//
//   report.rs          — per-class split summary CSV
//
// Reference: Rust Book §9 (Error Handling)

/// Token counting backends
pub mod tokenizer_store;

/// Reading and writing run artifacts
pub mod corpus_store;

/// Per-class split report
pub mod report;
