use std::sync::Arc;

use petal_db::BouquetStore;

use crate::validation::ValidationPolicy;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub store: Arc<dyn BouquetStore>,
    pub policy: ValidationPolicy,
}

impl AppStateInner {
    pub fn new(store: Arc<dyn BouquetStore>, policy: ValidationPolicy) -> AppState {
        Arc::new(Self { store, policy })
    }
}
