use std::fs;
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{retain_keyed, TableSource};
use crate::constants::{
    columns, BIOGRAPHY_SHEET, CAREERS_TABLE, COLLABORATORS_SHEET, COLLABORATORS_TABLE,
    DELEGATES_SHEET, DELEGATES_TABLE, MINISTERS_SHEET, MINISTRIES_SHEET, MINISTRIES_TABLE,
    OUTPUT_MINISTER_ROLE, PERSONS_TABLE, PERSON_MINISTRIES_TABLE,
};
use crate::error::{BuildError, Result};
use crate::types::{Row, SourceTables, Table};

/// Spreadsheet saved as one JSON object: sheet name to array of row objects.
///
/// The Ministries sheet carries its owner and primary flag inline; loading
/// splits it into a ministry row plus a person-ministry link so that both
/// formats join the same way.
pub struct Workbook {
    path: PathBuf,
}

impl Workbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for Workbook {
    fn describe(&self) -> String {
        format!("workbook {}", self.path.display())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<SourceTables> {
        let content = fs::read_to_string(&self.path)?;
        let document: Value = serde_json::from_str(&content)?;
        let sheets = document.as_object().ok_or_else(|| BuildError::InvalidSheet {
            sheet: "<workbook>".to_string(),
            reason: "top-level value must be an object of sheets".to_string(),
        })?;
        from_sheets(sheets)
    }
}

/// Build the logical tables from already-parsed sheets
pub fn from_sheets(sheets: &Map<String, Value>) -> Result<SourceTables> {
    let mut ministers = sheet_rows(sheets, MINISTERS_SHEET)?;
    // The Ministers sheet only lists office-holders
    for row in &mut ministers {
        if !row.has(columns::ROLE) {
            row.insert("role", Value::String(OUTPUT_MINISTER_ROLE.to_string()));
        }
    }

    let ministries = retain_keyed(
        MINISTRIES_TABLE,
        sheet_rows(sheets, MINISTRIES_SHEET)?,
        &[columns::ID],
    );
    let links: Vec<Row> = ministries
        .rows
        .iter()
        .filter(|row| row.has(columns::MINISTER_ID))
        .map(link_from_ministry)
        .collect();

    Ok(SourceTables {
        persons: retain_keyed(PERSONS_TABLE, ministers, &[columns::ID]),
        ministries,
        person_ministries: Table::new(PERSON_MINISTRIES_TABLE, links),
        careers: retain_keyed(
            CAREERS_TABLE,
            sheet_rows(sheets, BIOGRAPHY_SHEET)?,
            &[columns::MINISTER_ID],
        ),
        collaborators: retain_keyed(
            COLLABORATORS_TABLE,
            sheet_rows(sheets, COLLABORATORS_SHEET)?,
            &[columns::ID],
        ),
        delegates: retain_keyed(
            DELEGATES_TABLE,
            sheet_rows(sheets, DELEGATES_SHEET)?,
            &[columns::MINISTER_ID, columns::DELEGATE_ID],
        ),
    })
}

fn sheet_rows(sheets: &Map<String, Value>, sheet: &str) -> Result<Vec<Row>> {
    let Some(value) = sheets.get(sheet) else {
        debug!(sheet, "Sheet not present, using an empty table");
        return Ok(Vec::new());
    };
    let invalid = |reason: String| BuildError::InvalidSheet {
        sheet: sheet.to_string(),
        reason,
    };

    let entries = value
        .as_array()
        .ok_or_else(|| invalid("expected an array of rows".to_string()))?;
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| -> Result<Row> {
            let object = entry
                .as_object()
                .ok_or_else(|| invalid(format!("row {} is not an object", idx + 1)))?;
            let values = object
                .iter()
                .map(|(k, v)| (k.trim().to_string(), v.clone()))
                .collect();
            Ok(Row::new(idx + 1, values))
        })
        .collect()
}

fn link_from_ministry(row: &Row) -> Row {
    let mut link = Row::new(row.line, Default::default());
    let copy = |aliases: &[&str]| row.get(aliases).cloned().unwrap_or(Value::Null);
    link.insert("person_id", copy(columns::MINISTER_ID));
    link.insert("ministry_id", copy(columns::ID));
    link.insert("is_primary", copy(columns::IS_PRIMARY));
    link.insert("role_label", copy(columns::ROLE_LABEL));
    link
}
