// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one CLI command each:
//
//   clean    — raw CSV → cleaned corpus + label map
//   split    — cleaned corpus → train / dev / test + report
//   prepare  — both, in one run
//
// Rules for this layer:
//   - No sampling or filtering logic here (that's Layer 4)
//   - No printing here (that's Layer 1)
//   - Errors leave as anyhow::Error with file-path context

/// Raw CSV → cleaned corpus
pub mod clean_use_case;

/// Cleaned corpus → partitions
pub mod split_use_case;

/// Raw CSV → partitions
pub mod prepare_use_case;
