//! Table loading.
//!
//! Every source format sits behind [`TableSource`] and hands the rest of
//! the pipeline the same [`SourceTables`], so assembly, ordering and
//! validation exist exactly once.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{BuildError, Result};
use crate::types::{Row, SourceTables, Table};

pub mod csv_dir;
pub mod workbook;

pub use csv_dir::CsvDirectory;
pub use workbook::Workbook;

/// A readable source of logical tables
pub trait TableSource {
    /// Human-readable description used in logs
    fn describe(&self) -> String;

    /// Read every logical table. Absent optional tables come back empty.
    fn load(&self) -> Result<SourceTables>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Directory of `<table>.csv` files from the spreadsheet export
    CsvDirectory,
    /// Single JSON file keyed by sheet name
    Workbook,
}

impl SourceFormat {
    pub fn detect(path: &Path) -> Result<Self> {
        if path.is_dir() {
            return Ok(SourceFormat::CsvDirectory);
        }
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if path.is_file() && is_json {
            Ok(SourceFormat::Workbook)
        } else {
            Err(BuildError::UnsupportedSource(path.to_path_buf()))
        }
    }

    pub fn open(self, path: &Path) -> Box<dyn TableSource> {
        match self {
            SourceFormat::CsvDirectory => Box::new(CsvDirectory::new(path)),
            SourceFormat::Workbook => Box::new(Workbook::new(path)),
        }
    }
}

/// Load all tables from `path`, detecting the format unless one is forced
pub fn load_source(path: &Path, format: Option<SourceFormat>) -> Result<SourceTables> {
    let format = match format {
        Some(format) => format,
        None => SourceFormat::detect(path)?,
    };
    let source = format.open(path);
    info!("Loading tables from {}", source.describe());

    let tables = source.load()?;
    info!(
        persons = tables.persons.len(),
        ministries = tables.ministries.len(),
        person_ministries = tables.person_ministries.len(),
        careers = tables.careers.len(),
        collaborators = tables.collaborators.len(),
        delegates = tables.delegates.len(),
        "Tables loaded"
    );
    Ok(tables)
}

/// Keep only rows where every key column group is non-empty.
/// Each entry of `keys` is a list of aliases for one key column.
pub(crate) fn retain_keyed(name: &str, rows: Vec<Row>, keys: &[&[&str]]) -> Table {
    let total = rows.len();
    let rows: Vec<Row> = rows
        .into_iter()
        .filter(|row| keys.iter().all(|aliases| row.has(aliases)))
        .collect();
    let skipped = total - rows.len();
    if skipped > 0 {
        debug!(table = name, skipped, "Skipped rows with an empty key");
    }
    Table::new(name, rows)
}

pub(crate) fn missing_table(table: &str, path: &Path) -> BuildError {
    BuildError::MissingTable {
        table: table.to_string(),
        source_path: PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    #[test]
    fn test_retain_keyed_requires_every_key() {
        let mk = |line: usize, m: &str, d: serde_json::Value| {
            let mut values = IndexMap::new();
            values.insert("ministerId".to_string(), json!(m));
            values.insert("delegateId".to_string(), d);
            Row::new(line, values)
        };
        let rows = vec![
            mk(1, "m1", json!("m2")),
            mk(2, "m1", json!("")),
            mk(3, "", json!("m2")),
            mk(4, "m3", serde_json::Value::Null),
        ];
        let table = retain_keyed("delegates", rows, &[&["ministerId"], &["delegateId"]]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].line, 1);
    }

    #[test]
    fn test_detect_rejects_unknown_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            SourceFormat::detect(dir.path()).unwrap(),
            SourceFormat::CsvDirectory
        );

        let xlsx = dir.path().join("gouvernement.xlsx");
        std::fs::write(&xlsx, b"PK").unwrap();
        assert!(matches!(
            SourceFormat::detect(&xlsx),
            Err(BuildError::UnsupportedSource(_))
        ));

        let json_path = dir.path().join("gouvernement.json");
        std::fs::write(&json_path, b"{}").unwrap();
        assert_eq!(SourceFormat::detect(&json_path).unwrap(), SourceFormat::Workbook);
    }
}
