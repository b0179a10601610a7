// Google Sheets backed TableStore.
//
// Spreadsheets are opened by *name*, the way people think about them, which
// means a Drive search first and then the Sheets API for everything else.

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::service_account::ServiceAccountAuth;
use crate::core::records::table_store::records_from_grid;
use crate::core::records::{Record, SheetHandle, TableError, TableStore, WorksheetHandle};

const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

pub struct GoogleSheetsClient {
    client: Client,
    auth: Arc<ServiceAccountAuth>,
}

impl GoogleSheetsClient {
    pub fn new(auth: Arc<ServiceAccountAuth>) -> Self {
        Self {
            client: Client::new(),
            auth,
        }
    }

    async fn token(&self) -> Result<String, TableError> {
        Ok(self.auth.get_access_token().await?)
    }

    /// `.../spreadsheets/{id}/values/{range}{suffix}` with every segment escaped.
    fn values_url(worksheet: &WorksheetHandle, suffix: &str) -> Result<Url, TableError> {
        let mut url = Url::parse(SHEETS_API).map_err(|e| TableError::Remote(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| TableError::Remote("sheets API URL cannot be a base".to_string()))?
            .extend(["spreadsheets", worksheet.spreadsheet_id.as_str(), "values"])
            .push(&format!("{}{}", a1_range(&worksheet.title), suffix));
        Ok(url)
    }
}

/// Quotes a tab title for A1 notation: `It's` becomes `'It''s'`.
fn a1_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Escapes a value for a Drive `q` string literal.
fn drive_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// The tab titled `tab`, or the first tab (lowest index) when `tab` is `None`.
fn pick_worksheet(sheets: &[SheetMeta], tab: Option<&str>) -> Option<SheetProperties> {
    let found = match tab {
        Some(title) => sheets.iter().find(|s| s.properties.title == title),
        None => sheets.iter().min_by_key(|s| s.properties.index),
    };
    found.map(|s| SheetProperties {
        sheet_id: s.properties.sheet_id,
        title: s.properties.title.clone(),
        index: s.properties.index,
    })
}

async fn ensure_success(response: Response, context: &str) -> Result<Response, TableError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    tracing::warn!(%status, context, "Google API call failed");
    Err(TableError::Remote(format!("{context} ({status}): {text}")))
}

fn transport(err: reqwest::Error) -> TableError {
    TableError::Remote(err.to_string())
}

#[async_trait]
impl TableStore for GoogleSheetsClient {
    async fn open_sheet(&self, name: &str) -> Result<SheetHandle, TableError> {
        let token = self.token().await?;
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            drive_query_literal(name),
            SPREADSHEET_MIME
        );

        let response = self
            .client
            .get(format!("{DRIVE_API}/files"))
            .bearer_auth(&token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "10"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await
            .map_err(transport)?;
        let list: FileList = ensure_success(response, "Drive file search")
            .await?
            .json()
            .await
            .map_err(transport)?;

        if list.files.len() > 1 {
            tracing::warn!(
                name,
                matches = list.files.len(),
                "Several spreadsheets share this name, using the first one"
            );
        }

        let file = list
            .files
            .into_iter()
            .next()
            .ok_or_else(|| TableError::SpreadsheetNotFound(name.to_string()))?;

        tracing::info!(name = %file.name, id = %file.id, "Opened spreadsheet");
        Ok(SheetHandle {
            id: file.id,
            name: file.name,
        })
    }

    async fn open_worksheet(
        &self,
        sheet: &SheetHandle,
        tab: Option<&str>,
    ) -> Result<WorksheetHandle, TableError> {
        let token = self.token().await?;

        let response = self
            .client
            .get(format!("{SHEETS_API}/spreadsheets/{}", sheet.id))
            .bearer_auth(&token)
            .query(&[("fields", "sheets.properties(sheetId,title,index)")])
            .send()
            .await
            .map_err(transport)?;
        let meta: SpreadsheetMeta = ensure_success(response, "Spreadsheet metadata")
            .await?
            .json()
            .await
            .map_err(transport)?;

        let properties = pick_worksheet(&meta.sheets, tab).ok_or_else(|| {
            TableError::WorksheetNotFound(tab.unwrap_or("(first tab)").to_string())
        })?;

        Ok(WorksheetHandle {
            spreadsheet_id: sheet.id.clone(),
            sheet_id: properties.sheet_id,
            title: properties.title,
        })
    }

    async fn read_all(&self, worksheet: &WorksheetHandle) -> Result<Vec<Record>, TableError> {
        let token = self.token().await?;
        let url = Self::values_url(worksheet, "")?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&token)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
            ])
            .send()
            .await
            .map_err(transport)?;
        let range: ValueRange = ensure_success(response, "Reading worksheet values")
            .await?
            .json()
            .await
            .map_err(transport)?;

        Ok(records_from_grid(range.values))
    }

    async fn append(
        &self,
        worksheet: &WorksheetHandle,
        values: Vec<Value>,
    ) -> Result<(), TableError> {
        let token = self.token().await?;
        let url = Self::values_url(worksheet, ":append")?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "majorDimension": "ROWS", "values": [values] }))
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response, "Appending row").await?;

        tracing::debug!(worksheet = %worksheet.title, "Row appended to Google Sheet");
        Ok(())
    }
}
