//! The on-disk history table.
//!
//! A single CSV with a fixed header:
//!
//! ```text
//! observation_date,dbaa,gs10,spread,gtrend,anxiety_index
//! ```
//!
//! One row per date, in insertion order. The whole file is loaded, updated in
//! memory, and rewritten on every run. The read-modify-write is not atomic:
//! two concurrent runs can lose one update.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{debug, info, warn};

use crate::domain::AnxietyRecord;
use crate::error::AppError;

/// In-memory history rows, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryTable {
    records: Vec<AnxietyRecord>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<AnxietyRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AnxietyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recently inserted row.
    pub fn latest(&self) -> Option<&AnxietyRecord> {
        self.records.last()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&AnxietyRecord> {
        self.records.iter().rev().find(|r| r.observation_date == date)
    }

    /// Append `record`, then drop every earlier row for the same date.
    ///
    /// The newly appended values win and the row moves to the end.
    pub fn append_and_dedupe(&mut self, record: AnxietyRecord) {
        self.records.push(record);
        self.dedupe_keep_last();
    }

    fn dedupe_keep_last(&mut self) {
        let mut seen = std::collections::HashSet::new();
        let mut kept: Vec<AnxietyRecord> = self
            .records
            .iter()
            .rev()
            .filter(|r| seen.insert(r.observation_date))
            .copied()
            .collect();
        kept.reverse();
        self.records = kept;
    }
}

/// File-backed history.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the table, or `None` if the file is missing or unreadable.
    pub fn try_load(&self) -> Option<HistoryTable> {
        if !self.path.exists() {
            return None;
        }
        match read_table(&self.path) {
            Ok(table) => Some(table),
            Err(err) => {
                warn!("{err}");
                None
            }
        }
    }

    /// Load the table, starting empty when there is nothing usable on disk.
    pub fn load(&self) -> HistoryTable {
        match self.try_load() {
            Some(table) => {
                debug!("Loaded {} history rows from '{}'", table.len(), self.path.display());
                table
            }
            None => {
                info!(
                    "No usable history at '{}'; starting an empty table",
                    self.path.display()
                );
                HistoryTable::new()
            }
        }
    }

    /// Overwrite the file with the full table.
    pub fn save(&self, table: &HistoryTable) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::config(format!(
                    "Failed to create history directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        let file = File::create(&self.path).map_err(|e| {
            AppError::config(format!(
                "Failed to create history CSV '{}': {e}",
                self.path.display()
            ))
        })?;
        let mut writer = csv::Writer::from_writer(file);

        // Serialize writes the header from the first record; an empty table
        // still gets one.
        if table.is_empty() {
            writer
                .write_record(HEADER)
                .map_err(|e| AppError::config(format!("Failed to write history header: {e}")))?;
        }
        for record in table.records() {
            writer
                .serialize(record)
                .map_err(|e| AppError::config(format!("Failed to write history row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| AppError::config(format!("Failed to flush history CSV: {e}")))?;

        info!("Saved {} history rows to '{}'", table.len(), self.path.display());
        Ok(())
    }
}

const HEADER: [&str; 6] = [
    "observation_date",
    "dbaa",
    "gs10",
    "spread",
    "gtrend",
    "anxiety_index",
];

fn read_table(path: &Path) -> Result<HistoryTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::config(format!("Failed to open history CSV '{}': {e}", path.display()))
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<AnxietyRecord>().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::parse(format!(
                "Unreadable history CSV '{}' at line {line}: {e}",
                path.display()
            ))
        })?;
        records.push(record);
    }
    Ok(HistoryTable::from_records(records))
}
