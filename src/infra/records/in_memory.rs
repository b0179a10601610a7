// In-memory TableStore and FileStore. They behave like the Google backed
// ones (header row first, tabs by title, first tab by default) and count
// calls so tests can see what the caching layer actually did.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::links::direct_view_url;
use crate::core::records::table_store::records_from_grid;
use crate::core::records::{
    FileStore, Record, SheetHandle, TableError, TableStore, UploadError, WorksheetHandle,
};

/// Composite key: (spreadsheet id, worksheet title).
type TabKey = (String, String);

pub struct InMemoryTableStore {
    /// Spreadsheet name -> tab titles in creation order.
    sheets: DashMap<String, Vec<String>>,
    /// Raw grids, header row first.
    grids: DashMap<TabKey, Vec<Vec<Value>>>,
    reads: AtomicUsize,
    opens: AtomicUsize,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self {
            sheets: DashMap::new(),
            grids: DashMap::new(),
            reads: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
        }
    }

    pub fn with_worksheet(self, sheet: &str, title: &str, headers: &[&str]) -> Self {
        self.sheets
            .entry(sheet.to_string())
            .or_default()
            .push(title.to_string());
        let header = headers.iter().map(|h| Value::from(*h)).collect();
        self.grids.insert(key(sheet, title), vec![header]);
        self
    }

    /// Writes a row exactly as given, bypassing the typed schema.
    pub fn push_raw_row(&self, sheet: &str, title: &str, values: Vec<Value>) {
        if let Some(mut grid) = self.grids.get_mut(&key(sheet, title)) {
            grid.push(values);
        }
    }

    /// How many times `read_all` hit the store.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// How many worksheets were opened.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self::new()
    }
}

fn key(sheet: &str, title: &str) -> TabKey {
    (sheet.to_string(), title.to_string())
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn open_sheet(&self, name: &str) -> Result<SheetHandle, TableError> {
        if !self.sheets.contains_key(name) {
            return Err(TableError::SpreadsheetNotFound(name.to_string()));
        }
        // The name doubles as the id here.
        Ok(SheetHandle {
            id: name.to_string(),
            name: name.to_string(),
        })
    }

    async fn open_worksheet(
        &self,
        sheet: &SheetHandle,
        tab: Option<&str>,
    ) -> Result<WorksheetHandle, TableError> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        let tabs = self
            .sheets
            .get(&sheet.id)
            .ok_or_else(|| TableError::SpreadsheetNotFound(sheet.name.clone()))?;

        let position = match tab {
            Some(title) => tabs.iter().position(|t| t == title),
            None if tabs.is_empty() => None,
            None => Some(0),
        }
        .ok_or_else(|| TableError::WorksheetNotFound(tab.unwrap_or("(first tab)").to_string()))?;

        Ok(WorksheetHandle {
            spreadsheet_id: sheet.id.clone(),
            sheet_id: position as i64,
            title: tabs[position].clone(),
        })
    }

    async fn read_all(&self, worksheet: &WorksheetHandle) -> Result<Vec<Record>, TableError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let grid = self
            .grids
            .get(&key(&worksheet.spreadsheet_id, &worksheet.title))
            .ok_or_else(|| TableError::WorksheetNotFound(worksheet.title.clone()))?;
        Ok(records_from_grid(grid.clone()))
    }

    async fn append(
        &self,
        worksheet: &WorksheetHandle,
        values: Vec<Value>,
    ) -> Result<(), TableError> {
        let mut grid = self
            .grids
            .get_mut(&key(&worksheet.spreadsheet_id, &worksheet.title))
            .ok_or_else(|| TableError::WorksheetNotFound(worksheet.title.clone()))?;
        grid.push(values);
        Ok(())
    }
}

/// Keeps uploaded blobs per folder and hands out fake Drive URLs.
pub struct InMemoryFileStore {
    folders: DashMap<String, Vec<(String, Vec<u8>)>>,
    next_id: AtomicUsize,
    share_fails: bool,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self {
            folders: DashMap::new(),
            next_id: AtomicUsize::new(1),
            share_fails: false,
        }
    }

    /// Files are still created, but making them public fails afterwards.
    pub fn failing_share(mut self) -> Self {
        self.share_fails = true;
        self
    }

    pub fn stored_in(&self, folder_id: &str) -> usize {
        self.folders.get(folder_id).map_or(0, |files| files.len())
    }
}

impl Default for InMemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileStore for InMemoryFileStore {
    async fn upload(
        &self,
        blob: Vec<u8>,
        filename: &str,
        folder_id: &str,
    ) -> Result<String, UploadError> {
        if blob.is_empty() {
            return Err(UploadError::Create {
                filename: filename.to_string(),
                reason: "empty file".to_string(),
            });
        }

        let id = format!("mem{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.folders
            .entry(folder_id.to_string())
            .or_default()
            .push((filename.to_string(), blob));

        if self.share_fails {
            return Err(UploadError::Share {
                file_id: id,
                reason: "403: insufficient permissions".to_string(),
            });
        }
        Ok(direct_view_url(&id))
    }
}
