//! Notion API shapes for the courier database.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of `POST /v1/databases/{id}/query`.
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<&'a str>,
}

/// One page of query results. Rows stay as raw JSON so a single malformed
/// row can be skipped without failing the whole page.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Error object returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub code: String,
    pub message: String,
}

/// A database row describing one courier.
#[derive(Debug, Clone, Deserialize)]
pub struct CourierPage {
    pub id: String,
    pub properties: CourierProperties,
}

/// Courier columns, keyed by their names in the database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourierProperties {
    #[serde(rename = "Name", default)]
    pub name: Option<TitleProperty>,
    #[serde(rename = "Logo", default)]
    pub logo: Option<FilesProperty>,
    #[serde(rename = "Deliver to Metro Manila", default)]
    pub metro_price: Option<NumberProperty>,
    #[serde(rename = "Deliver Outside Metro Manila", default)]
    pub outside_metro_price: Option<NumberProperty>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleProperty {
    #[serde(default)]
    pub title: Vec<RichText>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    pub plain_text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesProperty {
    #[serde(default)]
    pub files: Vec<FileObject>,
}

/// An uploaded (`file`) or linked (`external`) file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileObject {
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub external: Option<FileUrl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NumberProperty {
    #[serde(default)]
    pub number: Option<Decimal>,
}
