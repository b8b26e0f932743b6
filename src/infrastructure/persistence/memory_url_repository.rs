//! Process-local URL repository.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{NewUrl, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

#[derive(Default)]
struct Store {
    by_id: HashMap<i64, UrlRecord>,
    by_origin: HashMap<String, i64>,
    last_id: i64,
}

/// In-memory repository with the same uniqueness guarantees as the
/// PostgreSQL one.
///
/// # Use Cases
///
/// - Development without a database
/// - Handler and integration tests
///
/// Records are lost when the process exits, and with them every issued code.
#[derive(Default)]
pub struct InMemoryUrlRepository {
    store: RwLock<Store>,
}

impl InMemoryUrlRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        debug!("Using in-memory URL repository");
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.store.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn find_by_origin_url(&self, origin_url: &str) -> Result<Option<UrlRecord>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .by_origin
            .get(origin_url)
            .and_then(|id| store.by_id.get(id))
            .cloned())
    }

    async fn create(&self, new_url: NewUrl) -> Result<UrlRecord, AppError> {
        let mut store = self.store.write().await;

        if let Some(record) = store
            .by_origin
            .get(&new_url.origin_url)
            .and_then(|id| store.by_id.get(id))
        {
            return Ok(record.clone());
        }

        store.last_id += 1;
        let now = Utc::now();
        let record = UrlRecord::new(store.last_id, new_url.origin_url, now, now);

        store
            .by_origin
            .insert(record.origin_url.clone(), record.id);
        store.by_id.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.store.read().await.by_id.get(&id).cloned())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
