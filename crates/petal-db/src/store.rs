//! The bouquet persistence contract shared by every backend.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use petal_types::{Bouquet, BouquetId, Cursor, NewBouquet, Page};

/// Page size when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a single page, whatever the caller asks for.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The remote backend has no actor identity yet. Retry shortly.
    #[error("Not ready to write: {0}")]
    PreconditionNotMet(String),

    #[error("Invalid pagination cursor")]
    InvalidCursor,

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt bouquet {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionNotMet(message.into())
    }

    pub fn corrupt(id: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::Corrupt {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Only a missing actor identity clears up on its own.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PreconditionNotMet(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Embedded SQLite file
    Local,
    /// Remote document database over HTTP
    Remote,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub count: Option<u32>,
    pub cursor: Option<Cursor>,
}

impl ListOptions {
    pub fn first(count: u32) -> Self {
        Self {
            count: Some(count),
            cursor: None,
        }
    }

    pub fn after(count: u32, cursor: Cursor) -> Self {
        Self {
            count: Some(count),
            cursor: Some(cursor),
        }
    }

    /// Effective page size. Zero means an empty page.
    pub fn page_size(&self) -> u32 {
        self.count.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }
}

/// Create / get / list over bouquets. Backends are chosen at composition
/// time and used as `Arc<dyn BouquetStore>`.
///
/// Content checks and delivery-date rules are enforced by the caller before
/// `create`; the store persists whatever it is given.
#[async_trait]
pub trait BouquetStore: Send + Sync {
    fn backend(&self) -> Backend;

    /// Persist a new bouquet, assigning its id and `created_at`.
    async fn create(&self, data: NewBouquet) -> StoreResult<BouquetId>;

    /// `Ok(None)` when no bouquet has this id.
    async fn get(&self, id: &BouquetId) -> StoreResult<Option<Bouquet>>;

    /// Public bouquets, newest first. `next_cursor` is `None` once a short
    /// page signals the end of the feed.
    async fn list_public(&self, options: ListOptions) -> StoreResult<Page>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_defaults_and_caps() {
        assert_eq!(ListOptions::default().page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(ListOptions::first(4).page_size(), 4);
        assert_eq!(ListOptions::first(10_000).page_size(), MAX_PAGE_SIZE);
        assert_eq!(ListOptions::first(0).page_size(), 0);
    }

    #[test]
    fn only_precondition_is_recoverable() {
        assert!(StoreError::precondition("signing in").is_recoverable());
        assert!(!StoreError::InvalidCursor.is_recoverable());
        assert!(!StoreError::corrupt("x", "bad date").is_recoverable());
    }
}
