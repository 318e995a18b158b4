// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between a raw news CSV and the three partitions.
//
//   news CSV
//       │
//       ▼
//   CsvLoader          → header check, raw rows
//       │               (Preprocessor normalises each cell)
//       ▼
//   Cleaner            → text / category / length filters,
//       │               token counts, labels
//       ▼
//   ClassFrequencyTable + QuotaPlan
//       │
//       ▼
//   Partitioner        → prune, sample, merge
//       │
//       ▼
//   train / dev / test
//
// Each module owns exactly one step and is tested on its own.

/// Reads the raw CSV into RawRecords
pub mod loader;

/// Normalises individual text cells
pub mod preprocessor;

/// Filters raw rows into a labeled Corpus
pub mod cleaner;

/// Per-class absolute and relative sizes
pub mod frequency;

/// Per-class train / dev / test quotas
pub mod quota;

/// Stratified, seeded train / dev / test partitioning
pub mod splitter;
