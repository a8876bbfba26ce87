use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Notion answered with an error object, e.g. `unauthorized` or
    /// `object_not_found`.
    #[error("Notion API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid courier record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    #[error("pagination limit reached for database {database_id}: exceeded {max_pages} pages")]
    PaginationLimit {
        database_id: String,
        max_pages: usize,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
