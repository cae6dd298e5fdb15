use std::sync::Arc;

use crate::db::{ItemRepository, MemoryStore, PgStore, WishlistRepository};
use crate::fetch::FetchClient;

/// Shared application state passed to all handlers and extractors.
/// The fetch client is built once at startup; its headers and cookies are
/// shared by every metadata extraction.
#[derive(Clone)]
pub struct AppState {
    pub wishlists: Arc<dyn WishlistRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub fetcher: Arc<FetchClient>,
    /// Allow item URLs that resolve to loopback or private addresses.
    pub allow_private_hosts: bool,
}

impl AppState {
    pub fn with_postgres(store: PgStore, fetcher: Arc<FetchClient>, allow_private_hosts: bool) -> Self {
        let store = Arc::new(store);
        AppState {
            wishlists: store.clone(),
            items: store,
            fetcher,
            allow_private_hosts,
        }
    }

    pub fn in_memory(fetcher: Arc<FetchClient>, allow_private_hosts: bool) -> Self {
        let store = Arc::new(MemoryStore::new());
        AppState {
            wishlists: store.clone(),
            items: store,
            fetcher,
            allow_private_hosts,
        }
    }
}
