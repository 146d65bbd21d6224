use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use petal_db::{BouquetStore, ListOptions, StoreError};
use petal_db::store::DEFAULT_PAGE_SIZE;
use petal_types::{Bouquet, Cursor, Page, PageOrdering};

use crate::describe;

/// What the feed shows. Any change resets the accumulated pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub page_size: u32,
    /// Case-insensitive match on message or recipient name. Empty shows all.
    pub search: String,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
        }
    }
}

impl FeedQuery {
    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    fn matches(&self, bouquet: &Bouquet) -> bool {
        let term = self.search.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        bouquet
            .message
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains(&term))
            || bouquet.recipient_name.to_lowercase().contains(&term)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub query: FeedQuery,
    /// Every bouquet fetched so far, in page order.
    pub items: Vec<Bouquet>,
    pub loading_initial: bool,
    pub loading_more: bool,
    pub has_more: bool,
    pub error: Option<String>,
    /// Ordering of the most recent page, once one has arrived.
    pub ordering: Option<PageOrdering>,
}

impl FeedState {
    fn fresh(query: FeedQuery) -> Self {
        Self {
            query,
            items: Vec::new(),
            loading_initial: false,
            loading_more: false,
            has_more: true,
            error: None,
            ordering: None,
        }
    }

    /// Fetched bouquets that match the search term.
    pub fn visible(&self) -> Vec<&Bouquet> {
        self.items.iter().filter(|b| self.query.matches(b)).collect()
    }

    pub fn loading(&self) -> bool {
        self.loading_initial || self.loading_more
    }
}

/// Paginated public feed. State belongs to this value; two feeds never
/// share pages.
pub struct PublicFeed {
    store: Arc<dyn BouquetStore>,
    cursor: Option<Cursor>,
    state: watch::Sender<FeedState>,
}

impl PublicFeed {
    pub fn new(store: Arc<dyn BouquetStore>, query: FeedQuery) -> Self {
        let (state, _) = watch::channel(FeedState::fresh(query));
        Self {
            store,
            cursor: None,
            state,
        }
    }

    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Discard everything fetched and load the first page.
    pub async fn load_initial(&mut self) {
        self.cursor = None;
        self.state.send_modify(|s| {
            let query = s.query.clone();
            *s = FeedState::fresh(query);
            s.loading_initial = true;
        });

        let result = self.fetch(None).await;
        self.apply(result, |s| s.loading_initial = false);
    }

    /// Append the next page. Does nothing while a load is running or once
    /// the feed is exhausted.
    pub async fn load_more(&mut self) {
        {
            let state = self.state.borrow();
            if state.loading() || !state.has_more {
                return;
            }
        }
        let Some(cursor) = self.cursor.clone() else {
            // Nothing fetched yet
            return self.load_initial().await;
        };

        self.state.send_modify(|s| {
            s.loading_more = true;
            s.error = None;
        });

        let result = self.fetch(Some(cursor)).await;
        self.apply(result, |s| s.loading_more = false);
    }

    /// Switch to a new query. A changed query drops all fetched pages and
    /// reloads from the first; an identical one is a no-op.
    pub async fn set_query(&mut self, query: FeedQuery) {
        if self.state.borrow().query == query {
            return;
        }
        debug!("Feed query changed, resetting");
        self.state.send_modify(|s| s.query = query);
        self.load_initial().await;
    }

    async fn fetch(&self, cursor: Option<Cursor>) -> Result<Page, StoreError> {
        let options = ListOptions {
            count: Some(self.state.borrow().query.page_size),
            cursor,
        };

        // Detached so that dropping the feed mid-request discards the page
        // without aborting the call.
        let store = self.store.clone();
        tokio::spawn(async move { store.list_public(options).await }).await?
    }

    fn apply(&mut self, result: Result<Page, StoreError>, finish: impl FnOnce(&mut FeedState)) {
        match result {
            Ok(page) => {
                self.cursor = page.next_cursor.clone();
                self.state.send_modify(|s| {
                    finish(s);
                    s.items.extend(page.items);
                    s.has_more = page.next_cursor.is_some();
                    s.ordering = Some(page.ordering);
                    s.error = None;
                });
            }
            Err(e) => {
                warn!("Failed to load public bouquets: {}", e);
                self.state.send_modify(|s| {
                    finish(s);
                    s.error = Some(describe(&e));
                });
            }
        }
    }
}
