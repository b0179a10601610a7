use crate::core::credentials::CredentialError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// One data row keyed by the worksheet's header row.
pub type Record = HashMap<String, Value>;

/// An opened spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetHandle {
    pub id: String,
    pub name: String,
}

/// An opened worksheet (tab) inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorksheetHandle {
    pub spreadsheet_id: String,
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Spreadsheet '{0}' not found")]
    SpreadsheetNotFound(String),

    #[error("Worksheet '{0}' not found")]
    WorksheetNotFound(String),

    #[error("Remote table error: {0}")]
    Remote(String),
}

impl TableError {
    /// Missing spreadsheet or tab. The user can fix this by creating it.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TableError::SpreadsheetNotFound(_) | TableError::WorksheetNotFound(_)
        )
    }
}

/// Port for the hosted spreadsheet acting as the only durable database.
///
/// No batching, no transactions. Appends from several clients are
/// serialized by the remote service.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn open_sheet(&self, name: &str) -> Result<SheetHandle, TableError>;

    /// Opens `tab` by title, or the first tab when `tab` is `None`.
    async fn open_worksheet(
        &self,
        sheet: &SheetHandle,
        tab: Option<&str>,
    ) -> Result<WorksheetHandle, TableError>;

    /// All data rows in storage order. An empty or header-only sheet yields an empty vec.
    async fn read_all(&self, worksheet: &WorksheetHandle) -> Result<Vec<Record>, TableError>;

    async fn append(&self, worksheet: &WorksheetHandle, values: Vec<Value>)
        -> Result<(), TableError>;
}

/// Turns a raw value grid (header row first) into records.
///
/// Short rows are padded with empty strings and fully blank rows are skipped.
pub fn records_from_grid(grid: Vec<Vec<Value>>) -> Vec<Record> {
    let mut rows = grid.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let keys: Vec<String> = header.iter().map(cell_text).collect();

    rows.filter(|row| row.iter().any(|cell| !cell_text(cell).is_empty()))
        .map(|row| {
            let mut cells = row.into_iter();
            keys.iter()
                .map(|key| {
                    let value = cells
                        .next()
                        .unwrap_or_else(|| Value::String(String::new()));
                    (key.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// Renders a cell as trimmed text the way a human would read it.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_grid_has_no_records() {
        assert!(records_from_grid(vec![]).is_empty());
        assert!(records_from_grid(vec![vec![json!("a"), json!("b")]]).is_empty());
    }

    #[test]
    fn short_rows_are_padded_and_blank_rows_skipped() {
        let grid = vec![
            vec![json!("想買的東西"), json!("誰許願的"), json!("備註")],
            vec![json!("switch"), json!("我")],
            vec![json!(""), json!("")],
            vec![json!("tent"), json!("男朋友"), json!("for camping")],
        ];

        let records = records_from_grid(grid);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["備註"], json!(""));
        assert_eq!(records[1]["備註"], json!("for camping"));
    }

    #[test]
    fn cell_text_drops_trailing_zero_fraction() {
        assert_eq!(cell_text(&json!(120)), "120");
        assert_eq!(cell_text(&json!(120.0)), "120");
        assert_eq!(cell_text(&json!(12.5)), "12.5");
        assert_eq!(cell_text(&json!("  hi ")), "hi");
    }
}
