use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, instrument};

use super::{missing_table, retain_keyed, TableSource};
use crate::constants::{
    columns, CAREERS_TABLE, COLLABORATORS_TABLE, DELEGATES_TABLE, MINISTRIES_TABLE,
    PERSONS_TABLE, PERSON_MINISTRIES_TABLE,
};
use crate::error::Result;
use crate::types::{RawValue, Row, SourceTables, Table};

/// Directory of CSV files, one per logical table.
///
/// A file belongs to a table when its stem is the table name or ends with
/// `" - <table>"`, which is how the shared spreadsheet names its exports.
pub struct CsvDirectory {
    root: PathBuf,
}

impl CsvDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Locate the CSV file for `table`; several matches resolve by file name order
    pub fn find_table(&self, table: &str) -> Result<Option<PathBuf>> {
        let suffix = format!(" - {table}");
        let mut matches: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .filter(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem == table || stem.ends_with(&suffix))
            })
            .collect();
        matches.sort();
        Ok(matches.into_iter().next())
    }

    fn read_optional(&self, table: &str) -> Result<Vec<Row>> {
        match self.find_table(table)? {
            Some(path) => read_rows(&path),
            None => {
                debug!(table, "Optional table not present, using an empty one");
                Ok(Vec::new())
            }
        }
    }
}

impl TableSource for CsvDirectory {
    fn describe(&self) -> String {
        format!("CSV directory {}", self.root.display())
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn load(&self) -> Result<SourceTables> {
        let persons_path = self
            .find_table(PERSONS_TABLE)?
            .ok_or_else(|| missing_table(PERSONS_TABLE, &self.root))?;

        Ok(SourceTables {
            persons: retain_keyed(PERSONS_TABLE, read_rows(&persons_path)?, &[columns::ID]),
            ministries: retain_keyed(
                MINISTRIES_TABLE,
                self.read_optional(MINISTRIES_TABLE)?,
                &[columns::ID],
            ),
            person_ministries: retain_keyed(
                PERSON_MINISTRIES_TABLE,
                self.read_optional(PERSON_MINISTRIES_TABLE)?,
                &[columns::PERSON_ID, columns::MINISTRY_ID],
            ),
            careers: retain_keyed(
                CAREERS_TABLE,
                self.read_optional(CAREERS_TABLE)?,
                &[columns::PERSON_ID],
            ),
            // Collaborators are persons rows in this format
            collaborators: Table::empty(COLLABORATORS_TABLE),
            delegates: retain_keyed(
                DELEGATES_TABLE,
                self.read_optional(DELEGATES_TABLE)?,
                &[columns::MINISTER_ID, columns::DELEGATE_ID],
            ),
        })
    }
}

/// Read one CSV file into rows. Empty cells become null.
pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let values: IndexMap<String, RawValue> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell = record.get(i).map(str::trim).unwrap_or_default();
                let value = if cell.is_empty() {
                    RawValue::Null
                } else {
                    RawValue::String(cell.to_string())
                };
                (header.clone(), value)
            })
            .collect();
        rows.push(Row::new(idx + 1, values));
    }
    debug!(path = %path.display(), rows = rows.len(), "Read CSV table");
    Ok(rows)
}
