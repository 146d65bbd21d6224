use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use petal_db::BouquetStore;
use petal_types::{Bouquet, BouquetId};

use crate::{Resource, describe};

/// A single bouquet being fetched. Starts out loading.
///
/// The request runs on its own task. Dropping the handle does not stop it;
/// the result is simply thrown away.
pub struct BouquetHandle {
    rx: watch::Receiver<Resource<Bouquet>>,
}

impl BouquetHandle {
    pub fn fetch(store: Arc<dyn BouquetStore>, id: BouquetId) -> Self {
        let (tx, rx) = watch::channel(Resource::loading());

        tokio::spawn(async move {
            let next = match store.get(&id).await {
                Ok(found) => Resource::ready(found),
                Err(e) => {
                    warn!("Failed to load bouquet {}: {}", id, e);
                    Resource::failed(describe(&e))
                }
            };
            if tx.send(next).is_err() {
                debug!("Bouquet {} arrived after its handle was dropped", id);
            }
        });

        Self { rx }
    }

    pub fn current(&self) -> Resource<Bouquet> {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Resource<Bouquet>> {
        self.rx.clone()
    }

    /// Wait until loading finishes.
    pub async fn settled(&mut self) -> Resource<Bouquet> {
        match self.rx.wait_for(|r| !r.loading).await {
            Ok(resource) => resource.clone(),
            Err(_) => Resource::failed("Something went wrong. Please try again."),
        }
    }
}
