use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use petal_types::{Bouquet, BouquetId, NewBouquet, Page, PageOrdering};

use crate::Database;
use crate::cursor;
use crate::store::{Backend, BouquetStore, ListOptions, StoreResult};

/// Bouquet store over the embedded SQLite database.
///
/// Writes are visible to the next read as soon as `create` returns.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
}

impl LocalStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(Database::open(path)?)))
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(Database::open_in_memory()?)))
    }
}

#[async_trait]
impl BouquetStore for LocalStore {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    async fn create(&self, data: NewBouquet) -> StoreResult<BouquetId> {
        let id = BouquetId::generate();

        // Run blocking DB insert off the async runtime
        let db = self.db.clone();
        let bid = id.clone();
        let delivery_type = data.delivery_type;
        let created_at = tokio::task::spawn_blocking(move || db.insert_bouquet(&bid, &data)).await??;

        debug!("Stored {} bouquet {} at {}", delivery_type, id, created_at);
        Ok(id)
    }

    async fn get(&self, id: &BouquetId) -> StoreResult<Option<Bouquet>> {
        let db = self.db.clone();
        let bid = id.to_string();
        let row = tokio::task::spawn_blocking(move || db.get_bouquet(&bid)).await??;

        row.map(|row| row.into_bouquet()).transpose()
    }

    async fn list_public(&self, options: ListOptions) -> StoreResult<Page> {
        let before_seq = options.cursor.as_ref().map(cursor::to_seq).transpose()?;
        let limit = options.page_size();
        if limit == 0 {
            return Ok(Page::empty(PageOrdering::Global));
        }

        let db = self.db.clone();
        let rows =
            tokio::task::spawn_blocking(move || db.list_public_bouquets(before_seq, limit)).await??;

        let next_cursor = if rows.len() == limit as usize {
            rows.last().map(|row| cursor::from_seq(row.seq))
        } else {
            None
        };

        let items = rows
            .into_iter()
            .map(|row| row.into_bouquet())
            .collect::<StoreResult<Vec<_>>>()?;

        debug!("Listed {} public bouquets (more: {})", items.len(), next_cursor.is_some());
        Ok(Page {
            items,
            next_cursor,
            ordering: PageOrdering::Global,
        })
    }
}
