use indexmap::IndexMap;

/// Untyped cell value as handed over by a table reader
pub type RawValue = serde_json::Value;

/// One row of a logical table: column name to raw value, in header order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// 1-based data row number within its table (header excluded)
    pub line: usize,
    pub values: IndexMap<String, RawValue>,
}

impl Row {
    pub fn new(line: usize, values: IndexMap<String, RawValue>) -> Self {
        Self { line, values }
    }

    /// First non-empty value among `aliases`
    pub fn get(&self, aliases: &[&str]) -> Option<&RawValue> {
        aliases
            .iter()
            .filter_map(|alias| self.values.get(*alias))
            .find(|value| !is_blank(value))
    }

    /// The column alias that actually carried the value, for error messages
    pub fn column_of(&self, aliases: &[&str]) -> String {
        aliases
            .iter()
            .find(|alias| self.values.get(**alias).is_some_and(|v| !is_blank(v)))
            .or_else(|| aliases.first())
            .map(|s| (*s).to_string())
            .unwrap_or_default()
    }

    /// Trimmed text rendering of the first non-empty alias
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        self.get(aliases).and_then(value_to_text)
    }

    /// Like [`Row::text`] but empty string when absent
    pub fn text_or_empty(&self, aliases: &[&str]) -> String {
        self.text(aliases).unwrap_or_default()
    }

    pub fn has(&self, aliases: &[&str]) -> bool {
        self.get(aliases).is_some()
    }

    pub fn insert(&mut self, column: &str, value: RawValue) {
        self.values.insert(column.to_string(), value);
    }
}

/// A blank cell: JSON null or whitespace-only text
pub fn is_blank(value: &RawValue) -> bool {
    match value {
        RawValue::Null => true,
        RawValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub fn value_to_text(value: &RawValue) -> Option<String> {
    match value {
        RawValue::Null => None,
        RawValue::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        RawValue::Bool(b) => Some(b.to_string()),
        RawValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", f as i64)),
                    _ => Some(n.to_string()),
                }
            }
        }
        // Nested values never come out of a sheet; keep them verbatim.
        other => Some(other.to_string()),
    }
}

/// A named, ordered sequence of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Every logical table the assembler consumes, already filtered on primary keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTables {
    pub persons: Table,
    pub ministries: Table,
    pub person_ministries: Table,
    pub careers: Table,
    pub collaborators: Table,
    pub delegates: Table,
}
