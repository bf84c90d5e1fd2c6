use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::host;

/// Normalized host -> remark, in the order entries were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionSet {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `host` unless already present. Returns false for a duplicate.
    pub fn insert(&mut self, host: String, remark: String) -> bool {
        if self.index.contains_key(&host) {
            return false;
        }
        self.index.insert(host.clone(), self.entries.len());
        self.entries.push((host, remark));
        true
    }

    pub fn get(&self, host: &str) -> Option<&str> {
        self.index
            .get(host)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(host, remark)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(host, remark)| (host.as_str(), remark.as_str()))
    }

    /// Decides whether `host` is excluded and with which remark.
    ///
    /// The full normalized host is tried first, then the part before the
    /// first `:` so a bare-host entry also covers every port on it.
    pub fn classify(&self, host: &str) -> (bool, String) {
        if host.is_empty() || self.is_empty() {
            return (false, String::new());
        }

        let clean = host::normalize(host);

        if let Some(remark) = self.get(&clean) {
            return (true, remark.to_string());
        }

        if let Some(host_only) = host::without_port(&clean) {
            if let Some(remark) = self.get(host_only) {
                return (true, remark.to_string());
            }
        }

        (false, String::new())
    }
}

/// One cell of the exclusion source.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Unreadable(String),
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Unreadable(e.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Column A holds the host, column B an optional remark.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub host: Cell,
    pub remark: Cell,
}

#[cfg(test)]
impl SourceRow {
    pub fn new(host: &str, remark: &str) -> Self {
        let cell = |value: &str| {
            if value.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(value.to_string())
            }
        };
        Self {
            host: cell(host),
            remark: cell(remark),
        }
    }
}

/// Non-fatal problems met while loading the exclusion source.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    SourceMissing(PathBuf),
    SourceEmpty,
    SourceUnreadable(String),
    UnreadableRow { row: usize, reason: String },
    UnreadableRemark { row: usize, reason: String },
    Duplicate { row: usize, host: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::SourceMissing(path) => {
                write!(f, "exclusion file not found: {}", path.display())
            }
            LoadWarning::SourceEmpty => write!(f, "exclusion file is empty"),
            LoadWarning::SourceUnreadable(reason) => {
                write!(f, "failed to read exclusion file: {reason}")
            }
            LoadWarning::UnreadableRow { row, reason } => {
                write!(f, "row {row} skipped, unreadable cell: {reason}")
            }
            LoadWarning::UnreadableRemark { row, reason } => {
                write!(f, "row {row} kept without remark, unreadable cell: {reason}")
            }
            LoadWarning::Duplicate { row, host } => {
                write!(f, "row {row} skipped, duplicate host: {host}")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub set: ExclusionSet,
    pub warnings: Vec<LoadWarning>,
}

/// Builds an exclusion set from already-read rows. Row numbers in warnings
/// are 1-based, matching the spreadsheet.
pub fn load_rows<I>(rows: I) -> LoadOutcome
where
    I: IntoIterator<Item = SourceRow>,
{
    let mut outcome = LoadOutcome::default();
    let mut seen_rows = 0usize;

    for (idx, row) in rows.into_iter().enumerate() {
        seen_rows += 1;
        let row_number = idx + 1;

        let raw_host = match row.host {
            Cell::Empty => continue,
            Cell::Text(text) => text,
            Cell::Unreadable(reason) => {
                outcome.warnings.push(LoadWarning::UnreadableRow {
                    row: row_number,
                    reason,
                });
                continue;
            }
        };

        let key = host::normalize(raw_host.trim());
        if key.is_empty() {
            continue;
        }

        let remark = match row.remark {
            Cell::Text(text) => text.trim().to_string(),
            Cell::Empty => String::new(),
            Cell::Unreadable(reason) => {
                outcome.warnings.push(LoadWarning::UnreadableRemark {
                    row: row_number,
                    reason,
                });
                String::new()
            }
        };

        if !outcome.set.insert(key.clone(), remark) {
            outcome.warnings.push(LoadWarning::Duplicate {
                row: row_number,
                host: key,
            });
        }
    }

    if seen_rows == 0 {
        outcome.warnings.push(LoadWarning::SourceEmpty);
    }

    outcome
}

/// Loads the first worksheet of the exclusion workbook at `path`.
///
/// Never fails: a missing, empty or unreadable workbook yields an empty set
/// and a warning, and the caller runs without exclusions.
pub fn load_file(path: &Path) -> LoadOutcome {
    let start_time = Instant::now();
    info!(action = "start", component = "exclusion_loading", file_path = ?path, "Loading exclusion list");

    let outcome = match read_source_rows(path) {
        Ok(rows) => load_rows(rows),
        Err(warning) => LoadOutcome {
            set: ExclusionSet::new(),
            warnings: vec![warning],
        },
    };

    for warning in &outcome.warnings {
        warn!(action = "load", component = "exclusion_loading", "{}", warning);
    }

    info!(
        action = "complete",
        component = "exclusion_loading",
        entry_count = outcome.set.len(),
        warning_count = outcome.warnings.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Exclusion list loaded"
    );
    outcome
}

fn read_source_rows(path: &Path) -> Result<Vec<SourceRow>, LoadWarning> {
    if !path.exists() {
        return Err(LoadWarning::SourceMissing(path.to_path_buf()));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| LoadWarning::SourceUnreadable(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| LoadWarning::SourceUnreadable(e.to_string()))?,
        None => return Err(LoadWarning::SourceEmpty),
    };

    // The range begins at the first used cell, which may sit below row 1 or
    // right of column A.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let start_col = start_col as usize;
    let cell_at = |row: &[Data], column: usize| -> Cell {
        column
            .checked_sub(start_col)
            .and_then(|offset| row.get(offset))
            .map(Cell::from)
            .unwrap_or(Cell::Empty)
    };

    let mut rows: Vec<SourceRow> = (0..start_row)
        .map(|_| SourceRow {
            host: Cell::Empty,
            remark: Cell::Empty,
        })
        .collect();
    rows.extend(range.rows().map(|row| SourceRow {
        host: cell_at(row, 0),
        remark: cell_at(row, 1),
    }));

    Ok(rows)
}
