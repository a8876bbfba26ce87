//! HTTP client for the Notion database query endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use shipmates_core::CourierRecord;

use crate::error::NotionError;
use crate::normalize::normalize_courier;
use crate::types::{CourierPage, ErrorBody, QueryRequest, QueryResponse};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1/";
const NOTION_VERSION: &str = "2022-06-28";

/// Rows requested per query page; Notion's maximum.
const PAGE_SIZE: u32 = 100;

/// Maximum number of pages to fetch before returning an error.
/// Prevents infinite loops on cycling cursors.
pub(crate) const MAX_PAGES: usize = 50;

/// Client for the Notion REST API.
///
/// Use [`NotionClient::new`] for production or [`NotionClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct NotionClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl NotionClient {
    /// # Errors
    ///
    /// Returns [`NotionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, NotionError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`NotionError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shipmates/0.1 (courier-catalog)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| NotionError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Fetches every courier row of `database_id`, following pagination.
    ///
    /// Rows that fail to parse or normalize are skipped with a warning; the
    /// order of the database query is preserved.
    ///
    /// # Errors
    ///
    /// - [`NotionError::Api`] if Notion rejects the query.
    /// - [`NotionError::Http`] on network failure.
    /// - [`NotionError::Deserialize`] if a page envelope is malformed.
    /// - [`NotionError::PaginationLimit`] if more than `MAX_PAGES` pages are returned.
    pub async fn fetch_couriers(
        &self,
        database_id: &str,
    ) -> Result<Vec<CourierRecord>, NotionError> {
        let mut couriers = Vec::new();
        let mut cursor: Option<String> = None;

        for page_num in 1..=MAX_PAGES {
            let page = self.query_page(database_id, cursor.as_deref()).await?;

            for row in page.results {
                match parse_row(row) {
                    Ok(record) => couriers.push(record),
                    Err(e) => {
                        tracing::warn!(database_id, error = %e, "skipping courier row");
                    }
                }
            }

            tracing::debug!(
                database_id,
                page = page_num,
                total = couriers.len(),
                has_more = page.has_more,
                "fetched courier page"
            );

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => return Ok(couriers),
            }
        }

        Err(NotionError::PaginationLimit {
            database_id: database_id.to_owned(),
            max_pages: MAX_PAGES,
        })
    }

    /// Runs one `databases/{id}/query` call.
    ///
    /// # Errors
    ///
    /// - [`NotionError::Api`] on a non-2xx status (with Notion's error code
    ///   when the body carries one).
    /// - [`NotionError::Http`] on network failure.
    /// - [`NotionError::Deserialize`] if the body is not a query response.
    pub async fn query_page(
        &self,
        database_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<QueryResponse, NotionError> {
        let url = self.query_url(database_id)?;
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&QueryRequest {
                page_size: PAGE_SIZE,
                start_cursor,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = match serde_json::from_str::<ErrorBody>(&body) {
                Ok(e) => NotionError::Api {
                    status: e.status,
                    code: e.code,
                    message: e.message,
                },
                Err(_) => NotionError::Api {
                    status: status.as_u16(),
                    code: "unknown".to_string(),
                    message: body.chars().take(200).collect(),
                },
            };
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| NotionError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    fn query_url(&self, database_id: &str) -> Result<Url, NotionError> {
        self.base_url
            .join(&format!("databases/{database_id}/query"))
            .map_err(|e| NotionError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

fn parse_row(row: serde_json::Value) -> Result<CourierRecord, NotionError> {
    let page: CourierPage = serde_json::from_value(row).map_err(|e| NotionError::Deserialize {
        context: "courier row".to_string(),
        source: e,
    })?;
    normalize_courier(page)
}
