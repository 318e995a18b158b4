// ============================================================
// Layer 5 — Corpus Store
// ============================================================
// Reads and writes every artifact of a run in one directory:
//
//   output_dir/
//     clean_data.csv        ← cleaned corpus, all Record fields
//     label_map.json        ← {"0": "Business", "1": ...}
//     train_set.csv         ← train partition
//     dev_set.csv           ← dev partition
//     test_set.csv          ← test partition
//     split_report.csv      ← per-class counts
//     *_config.json         ← effective configuration of the run
//
// Writes go through an ArtifactBatch: every file is first written
// as `.<name>.partial` next to its target, and only `commit` moves
// the files into place. A batch dropped before `commit` removes its
// partial files, so the files already in the directory stay as they
// were.
//
// All CSV files share one schema (the Record field order), so a
// partition can be loaded back exactly like the cleaned corpus.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::data::splitter::{Partition, Partitions};
use crate::domain::corpus::{Corpus, LabelMap};
use crate::domain::error::PrepError;
use crate::domain::record::Record;

pub const CLEAN_DATA_FILE: &str = "clean_data.csv";
pub const LABEL_MAP_FILE: &str = "label_map.json";

/// CSV header, in `Record` field order.
const RECORD_COLUMNS: [&str; 8] = [
    "id",
    "title",
    "description",
    "category",
    "title_token_length",
    "description_token_length",
    "article_token_length",
    "label",
];

/// File name of a partition's CSV.
pub fn partition_file(partition: Partition) -> String {
    format!("{}_set.csv", partition.name())
}

/// The artifact directory of a run.
pub struct CorpusStore {
    dir: PathBuf,
}

impl CorpusStore {
    /// Create the store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, PrepError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Start a set of writes that lands in the directory all together.
    pub fn batch(&self) -> ArtifactBatch<'_> {
        ArtifactBatch {
            dir: &self.dir,
            staged: Vec::new(),
        }
    }
}

// ─── ArtifactBatch ────────────────────────────────────────────────────────────
/// Files written under temporary names, moved into place by `commit`.
pub struct ArtifactBatch<'a> {
    dir: &'a Path,
    /// (partial file, final path), in write order
    staged: Vec<(PathBuf, PathBuf)>,
}

impl ArtifactBatch<'_> {
    /// Run `write` against the partial path of `file_name`.
    /// Returns the path the file will have once committed.
    pub fn write(
        &mut self,
        file_name: &str,
        write: impl FnOnce(&Path) -> Result<(), PrepError>,
    ) -> Result<PathBuf, PrepError> {
        let target = self.dir.join(file_name);
        let partial = self.dir.join(format!(".{file_name}.partial"));
        // Registered first so a half-written file is cleaned up too
        self.staged.push((partial.clone(), target.clone()));
        write(&partial)?;
        Ok(target)
    }

    /// Stage the cleaned corpus and its label map.
    pub fn corpus(&mut self, corpus: &Corpus) -> Result<PathBuf, PrepError> {
        let path = self.write(CLEAN_DATA_FILE, |p| write_records(p, corpus.records()))?;
        self.label_map(corpus.label_map())?;
        tracing::info!("Staged {} cleaned records for '{}'", corpus.len(), path.display());
        Ok(path)
    }

    /// Stage the three partition CSVs.
    pub fn partitions(&mut self, partitions: &Partitions) -> Result<(), PrepError> {
        for (partition, records) in partitions.iter() {
            let path = self.write(&partition_file(partition), |p| write_records(p, records))?;
            tracing::info!(
                "Staged {} partition ({} records) for '{}'",
                partition.name(),
                records.len(),
                path.display()
            );
        }
        Ok(())
    }

    pub fn label_map(&mut self, label_map: &LabelMap) -> Result<PathBuf, PrepError> {
        let path = self.write(LABEL_MAP_FILE, |p| write_json(p, label_map))?;
        tracing::debug!("Staged label map with {} classes", label_map.len());
        Ok(path)
    }

    /// Stage any serialisable configuration as pretty JSON.
    pub fn config<C: Serialize>(
        &mut self,
        file_name: &str,
        config: &C,
    ) -> Result<PathBuf, PrepError> {
        self.write(file_name, |p| write_json(p, config))
    }

    /// Move every staged file into place, in write order.
    ///
    /// A failed rename leaves the remaining partial files to be
    /// removed when the batch is dropped.
    pub fn commit(mut self) -> Result<(), PrepError> {
        while let Some((partial, target)) = self.staged.first() {
            fs::rename(partial, target)?;
            self.staged.remove(0);
        }
        tracing::debug!("Committed artifacts in '{}'", self.dir.display());
        Ok(())
    }
}

impl Drop for ArtifactBatch<'_> {
    fn drop(&mut self) {
        for (partial, _) in &self.staged {
            match fs::remove_file(partial) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    tracing::warn!("Cannot remove '{}': {}", partial.display(), e);
                }
                _ => {}
            }
        }
    }
}

// ─── Loading ──────────────────────────────────────────────────────────────────
/// Read a label map written by `ArtifactBatch::label_map`.
pub fn load_label_map(path: &Path) -> Result<LabelMap, PrepError> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Read a cleaned corpus CSV back.
///
/// Every row must satisfy what cleaning guarantees: a unique `id`,
/// non-empty title and description, a title of at most
/// `max_title_tokens`, an article length equal to the sum of its
/// parts, and a `(label, category)` pair that `label_map` agrees with.
pub fn load_corpus(
    path: &Path,
    label_map: LabelMap,
    max_title_tokens: usize,
) -> Result<Corpus, PrepError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    let mut ids = HashSet::new();

    for (i, result) in reader.deserialize().enumerate() {
        let record: Record = result?;
        // 1-based data row, header excluded
        let row = i + 1;
        check_record(row, &record, &label_map, max_title_tokens)?;
        if !ids.insert(record.id) {
            return Err(PrepError::Config(format!(
                "row {row}: id {} appears more than once",
                record.id
            )));
        }
        records.push(record);
    }

    if records.is_empty() {
        return Err(PrepError::EmptyInput {
            stage: "cleaned corpus load",
        });
    }
    tracing::info!("Loaded {} cleaned records from '{}'", records.len(), path.display());
    Ok(Corpus::new(records, label_map))
}

fn check_record(
    row: usize,
    r: &Record,
    label_map: &LabelMap,
    max_title_tokens: usize,
) -> Result<(), PrepError> {
    let problem = if r.title.trim().is_empty() {
        "empty title".to_string()
    } else if r.description.trim().is_empty() {
        "empty description".to_string()
    } else if r.title_token_length > max_title_tokens {
        format!(
            "title has {} tokens, more than {max_title_tokens}",
            r.title_token_length
        )
    } else if r.article_token_length != r.title_token_length + r.description_token_length {
        format!(
            "article_token_length {} is not {} + {}",
            r.article_token_length, r.title_token_length, r.description_token_length
        )
    } else if label_map.category(r.label) != Some(r.category.as_str()) {
        format!(
            "label {} / category '{}' is not a pair in the label map",
            r.label, r.category
        )
    } else {
        return Ok(());
    };
    Err(PrepError::Config(format!("row {row} (id {}): {problem}", r.id)))
}

// ─── Writing ──────────────────────────────────────────────────────────────────
/// The header is written explicitly so empty partitions still carry it.
fn write_records(path: &Path, records: &[Record]) -> Result<(), PrepError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(RECORD_COLUMNS)?;
    for r in records {
        writer.serialize(r)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PrepError> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}
