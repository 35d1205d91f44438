//! Google Sheets v4 REST exporter.

use std::time::Duration;

use jobscrape_core::{CoreError, Exporter, Table};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument};
use url::Url;

use super::auth::{ServiceAccountKey, TokenSource};
use crate::error::ServiceError;

// ============================================================================
// Constants
// ============================================================================

/// Spreadsheets collection endpoint.
pub const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// OAuth2 token endpoint.
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Rows of a newly created worksheet.
const NEW_SHEET_ROWS: u32 = 1000;

/// Columns of a newly created worksheet.
const NEW_SHEET_COLUMNS: u32 = 26;

const HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Metadata
// ============================================================================

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
struct SheetProperties {
    title: String,
}

// ============================================================================
// Exporter
// ============================================================================

/// Publishes tables to worksheets of one spreadsheet.
#[derive(Debug)]
pub struct SheetsExporter {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    tokens: TokenSource,
}

impl SheetsExporter {
    /// Creates an exporter for `spreadsheet_id`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(spreadsheet_id: impl Into<String>, tokens: TokenSource) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let base_url = Url::parse(SHEETS_BASE_URL)
            .map_err(|e| ServiceError::InvalidResponse(format!("bad base URL: {e}")))?;

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        })
    }

    /// Creates an exporter authenticating with a service-account key file.
    ///
    /// # Errors
    ///
    /// Fails if the key file is unreadable.
    pub fn with_service_account(
        spreadsheet_id: impl Into<String>,
        key_path: &std::path::Path,
        token_url: &str,
    ) -> Result<Self, ServiceError> {
        let key = ServiceAccountKey::load(key_path)?;
        Self::new(spreadsheet_id, TokenSource::service_account(key, token_url))
    }

    /// Overrides the API base URL.
    ///
    /// # Errors
    ///
    /// Fails if `base_url` is not an absolute URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ServiceError> {
        self.base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ServiceError::InvalidResponse(format!("bad base URL {base_url}: {e}")))?;
        Ok(self)
    }

    /// Spreadsheet being written.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Builds `<base>/<segments...>`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidResponse("base URL cannot have a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn bearer(&self) -> Result<String, ServiceError> {
        self.tokens.token(&self.http).await
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ServiceError::from_response(response).await)
        }
    }

    /// Titles of all worksheets.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or an error status.
    pub async fn worksheet_titles(&self) -> Result<Vec<String>, ServiceError> {
        let mut url = self.endpoint(&[self.spreadsheet_id.as_str()])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::check(response).await?.json().await?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    /// Adds a worksheet unless one with that title exists.
    #[instrument(skip(self))]
    pub async fn ensure_worksheet(&self, title: &str) -> Result<(), ServiceError> {
        if self.worksheet_titles().await?.iter().any(|t| t == title) {
            return Ok(());
        }

        info!(worksheet = title, "Creating worksheet");
        let target = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.endpoint(&[target.as_str()])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": title,
                        "gridProperties": {
                            "rowCount": NEW_SHEET_ROWS,
                            "columnCount": NEW_SHEET_COLUMNS,
                        }
                    }
                }
            }]
        });

        let response = self
            .http
            .post(url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Clears every cell of a worksheet.
    pub async fn clear(&self, title: &str) -> Result<(), ServiceError> {
        let target = format!("{title}:clear");
        let url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", target.as_str()])?;
        let response = self
            .http
            .post(url)
            .bearer_auth(self.bearer().await?)
            .json(&json!({}))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Writes `values` starting at A1.
    pub async fn write(&self, title: &str, values: Vec<Vec<String>>) -> Result<(), ServiceError> {
        let range = format!("{title}!A1");
        let mut url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });

        let response = self
            .http
            .put(url)
            .bearer_auth(self.bearer().await?)
            .json(&body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Replaces a worksheet's content with `table`.
    #[instrument(skip(self, table), fields(spreadsheet = %self.spreadsheet_id, rows = table.len()))]
    pub async fn replace(&self, worksheet: &str, table: &Table) -> Result<(), ServiceError> {
        self.ensure_worksheet(worksheet).await?;
        self.clear(worksheet).await?;
        self.write(worksheet, table.to_values()).await?;
        debug!(worksheet, "Worksheet replaced");
        Ok(())
    }
}

impl Exporter for SheetsExporter {
    fn name(&self) -> &'static str {
        "sheets"
    }

    async fn publish(&self, worksheet: &str, table: &Table) -> Result<(), CoreError> {
        self.replace(worksheet, table).await.map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_segments() {
        let exporter = SheetsExporter::new("abc", TokenSource::fixed("t"))
            .unwrap()
            .with_base_url("http://localhost:9/v4/spreadsheets/")
            .unwrap();

        let url = exporter.endpoint(&["abc", "values", "all!A1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9/v4/spreadsheets/abc/values/all!A1");

        let url = exporter.endpoint(&["abc:batchUpdate"]).unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/abc:batchUpdate");
    }

    #[test]
    fn test_worksheet_names_are_escaped() {
        let exporter = SheetsExporter::new("abc", TokenSource::fixed("t")).unwrap();
        let url = exporter.endpoint(&["abc", "values", "my sheet/2!A1"]).unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/abc/values/my%20sheet%2F2!A1");
    }
}
