use std::sync::Arc;

use crate::{
    db::DbPool,
    store::{CartStore, Catalog, MemoryStore, PgStore},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CartStore>,
    pub catalog: Arc<dyn Catalog>,
}

impl AppState {
    pub fn postgres(pool: DbPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            store: store.clone(),
            catalog: store,
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            store: store.clone(),
            catalog: store,
        }
    }
}
