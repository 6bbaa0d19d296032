//! Shared application state for the Axum server.
//!
//! Holds the one storage handle, chosen at startup:
//! - **Database mode**: `PgStore` over a `PgPool` (production).
//! - **In-memory mode**: `MemoryStore` (tests and development).

use std::sync::Arc;

use crate::store::{MemoryStore, RecordStore};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend shared by all handlers.
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    /// Create state over an already constructed store.
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Create empty in-memory state (for tests).
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Create in-memory state with a sample vehicle, DTCs and adapter.
    pub fn with_sample_data() -> Self {
        Self::with_store(Arc::new(MemoryStore::with_sample_data()))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
