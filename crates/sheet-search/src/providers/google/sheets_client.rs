//! Google Drive folder listing and Sheets grid access

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use super::auth::ServiceAccountAuth;
use crate::config::GoogleConfig;
use crate::error::{Error, Result};
use crate::providers::spreadsheet::{SpreadsheetDocument, SpreadsheetProvider};
use crate::types::{DocumentRef, SheetInfo};

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Map a failed API status to the error taxonomy
fn status_error(status: StatusCode, context: &str, body: &str) -> Error {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::authentication(format!("{} denied ({}): {}", context, status, body))
        }
        _ => Error::provider(format!("{} failed ({}): {}", context, status, body)),
    }
}

async fn check_response(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, context, &body))
}

/// Drive query selecting the live spreadsheets directly under a folder
fn folder_query(folder_id: &str) -> String {
    let escaped = folder_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "'{}' in parents and mimeType='{}' and trashed=false",
        escaped, SPREADSHEET_MIME
    )
}

/// A1 range addressing a sheet by its quoted title, optionally narrowed to `range`
fn sheet_range(sheet_title: &str, range: Option<&str>) -> String {
    let quoted = format!("'{}'", sheet_title.replace('\'', "''"));
    match range {
        Some(range) => format!("{}!{}", quoted, range),
        None => quoted,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetMeta {
    #[serde(default)]
    properties: Option<SpreadsheetProperties>,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    title: String,
    #[serde(default)]
    index: u32,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'a str,
    values: Vec<Vec<Value>>,
}

/// Google Drive v3 + Sheets v4 client
pub struct GoogleSheetsClient {
    auth: Arc<ServiceAccountAuth>,
    drive_api_base: String,
    sheets_api_base: String,
}

impl GoogleSheetsClient {
    /// Create a client over an existing authentication handle
    pub fn new(auth: Arc<ServiceAccountAuth>, config: &GoogleConfig) -> Self {
        Self {
            auth,
            drive_api_base: config.drive_api_base.trim_end_matches('/').to_string(),
            sheets_api_base: config.sheets_api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Authenticate from a service account key file
    pub fn from_credentials(credentials_path: impl AsRef<Path>, config: &GoogleConfig) -> Result<Self> {
        let mut auth = ServiceAccountAuth::from_key_file(credentials_path)?;
        if let Some(ref token_uri) = config.token_uri_override {
            auth = auth.with_token_uri(token_uri.clone());
        }
        tracing::info!("Authenticated as {}", auth.client_email());
        Ok(Self::new(Arc::new(auth), config))
    }
}

#[async_trait]
impl SpreadsheetProvider for GoogleSheetsClient {
    async fn list_documents_in_folder(&self, folder_id: &str) -> Result<Vec<DocumentRef>> {
        let client = self.auth.authorized_client().await?;
        let query = folder_query(folder_id);
        let url = format!("{}/files", self.drive_api_base);

        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = client.get(&url).query(&[
                ("q", query.as_str()),
                ("fields", "nextPageToken, files(id, name)"),
                ("pageSize", "1000"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ]);
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Error::provider(format!("Drive file listing failed: {}", e)))?;
            let page: FileListPage = check_response(response, "Drive file listing")
                .await?
                .json()
                .await
                .map_err(|e| Error::provider(format!("Invalid Drive file listing: {}", e)))?;

            documents.extend(
                page.files
                    .into_iter()
                    .map(|f| DocumentRef::new(f.id, f.name)),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn open(&self, file_id: &str) -> Result<Box<dyn SpreadsheetDocument>> {
        let client = self.auth.authorized_client().await?;
        let url = format!("{}/spreadsheets/{}", self.sheets_api_base, file_id);

        let response = client
            .get(&url)
            .query(&[("fields", "properties.title,sheets.properties(sheetId,title,index)")])
            .send()
            .await
            .map_err(|e| Error::provider(format!("Opening spreadsheet {} failed: {}", file_id, e)))?;
        let meta: SpreadsheetMeta = check_response(response, "Opening spreadsheet")
            .await?
            .json()
            .await
            .map_err(|e| Error::provider(format!("Invalid spreadsheet metadata: {}", e)))?;

        let sheets = meta
            .sheets
            .into_iter()
            .map(|s| SheetInfo::new(s.properties.sheet_id, s.properties.title, s.properties.index))
            .collect();

        Ok(Box::new(GoogleSpreadsheet {
            auth: self.auth.clone(),
            sheets_api_base: self.sheets_api_base.clone(),
            file_id: file_id.to_string(),
            title: meta.properties.map(|p| p.title).unwrap_or_default(),
            sheets,
        }))
    }

    fn name(&self) -> &str {
        "google-sheets"
    }
}

/// An opened Google spreadsheet
pub struct GoogleSpreadsheet {
    auth: Arc<ServiceAccountAuth>,
    sheets_api_base: String,
    file_id: String,
    title: String,
    sheets: Vec<SheetInfo>,
}

impl GoogleSpreadsheet {
    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/spreadsheets/{}/values",
            self.sheets_api_base, self.file_id
        ))
        .map_err(|e| Error::Config(format!("Invalid Sheets API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config("Sheets API base URL cannot hold a path".to_string()))?
            .push(range);
        Ok(url)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<Value>>> {
        let client = self.auth.authorized_client().await?;
        let response = client
            .get(self.values_url(range)?)
            .query(&[("valueRenderOption", "FORMATTED_VALUE"), ("majorDimension", "ROWS")])
            .send()
            .await
            .map_err(|e| Error::provider(format!("Reading {} failed: {}", range, e)))?;

        let value_range: ValueRange = check_response(response, "Reading values")
            .await?
            .json()
            .await
            .map_err(|e| Error::provider(format!("Invalid value range for {}: {}", range, e)))?;

        Ok(value_range.values)
    }
}

#[async_trait]
impl SpreadsheetDocument for GoogleSpreadsheet {
    fn file_id(&self) -> &str {
        &self.file_id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn sheets(&self) -> &[SheetInfo] {
        &self.sheets
    }

    async fn read_all_values(&self, sheet: &SheetInfo) -> Result<Vec<Vec<Value>>> {
        self.get_values(&sheet_range(&sheet.title, None)).await
    }

    async fn read_range(&self, sheet_title: &str, range: &str) -> Result<Vec<Vec<Value>>> {
        self.get_values(&sheet_range(sheet_title, Some(range))).await
    }

    async fn write_range(&self, sheet_title: &str, range: &str, values: Vec<Vec<Value>>) -> Result<()> {
        let target = sheet_range(sheet_title, Some(range));
        let client = self.auth.authorized_client().await?;
        let body = ValueRangeBody {
            range: &target,
            major_dimension: "ROWS",
            values,
        };

        let response = client
            .put(self.values_url(&target)?)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider(format!("Writing {} failed: {}", target, e)))?;
        check_response(response, "Writing values").await?;

        tracing::info!("Wrote range {} in {}", target, self.file_id);
        Ok(())
    }
}
