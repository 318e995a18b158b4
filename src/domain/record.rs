// ============================================================
// Layer 3 — News Record Types
// ============================================================
// A record moves through two shapes:
//
//   RawRecord → exactly what the source gave us; any of the
//               three text fields may be missing
//   Record    → a cleaned article with token-length features
//               and a dense integer label
//
// Record identity is `id`, the 0-based data row position in
// the source. Partitions are disjoint with respect to it.

use serde::{Deserialize, Serialize};

/// One row as read from the source, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    /// Row position in the source (header excluded)
    pub id: usize,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl RawRecord {
    pub fn new(
        id: usize,
        title: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
    ) -> Self {
        Self {
            id,
            title: title.map(str::to_string),
            description: description.map(str::to_string),
            category: category.map(str::to_string),
        }
    }

    /// True when both text fields are present.
    pub fn has_text(&self) -> bool {
        self.title.is_some() && self.description.is_some()
    }
}

/// A cleaned, labeled news article.
///
/// Field order is also the column order of every CSV artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: usize,
    pub title: String,
    pub description: String,
    pub category: String,
    pub title_token_length: usize,
    pub description_token_length: usize,
    /// Always `title_token_length + description_token_length`
    pub article_token_length: usize,
    pub label: u32,
}

impl Record {
    pub fn new(
        id: usize,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        title_token_length: usize,
        description_token_length: usize,
        label: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            category: category.into(),
            title_token_length,
            description_token_length,
            article_token_length: title_token_length + description_token_length,
            label,
        }
    }
}
