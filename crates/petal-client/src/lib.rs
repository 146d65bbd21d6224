//! Retrieval hooks over a [`BouquetStore`](petal_db::BouquetStore).
//!
//! Each hook owns its state and publishes it over a `tokio::sync::watch`
//! channel as `{data, loading, error}`. Requests cannot be aborted; a result
//! that arrives after its owner is gone is discarded.

pub mod bouquet;
pub mod feed;

pub use bouquet::BouquetHandle;
pub use feed::{FeedQuery, FeedState, PublicFeed};

use petal_db::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Resource<T> {
    pub fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    /// `data: None` here means "not found", which is not an error.
    pub fn ready(data: Option<T>) -> Self {
        Self {
            data,
            loading: false,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            loading: false,
            error: Some(error.into()),
        }
    }
}

/// Message safe to show a reader.
pub(crate) fn describe(err: &StoreError) -> String {
    if err.is_recoverable() {
        "Not ready yet. Please try again in a moment.".to_string()
    } else {
        "Something went wrong. Please try again.".to_string()
    }
}
