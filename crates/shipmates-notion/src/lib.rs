pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::NotionClient;
pub use error::NotionError;
pub use normalize::normalize_courier;
pub use types::{CourierPage, QueryResponse};
