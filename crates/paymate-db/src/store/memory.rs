//! In-process document store for tests and demos. Nothing is persisted.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::{notify, put_events, ChangeEvent, DocumentStore};
use crate::error::DbResult;

#[derive(Debug, Clone)]
struct Entry {
    owner_id: String,
    body: Value,
}

/// collection -> id -> entry
type Collections = HashMap<String, BTreeMap<String, Entry>>;

#[derive(Debug)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl MemoryDocumentStore {
    /// `buffer` is the change-channel capacity per subscriber.
    pub fn new(buffer: usize) -> Self {
        let (changes, _) = broadcast::channel(buffer.max(1));
        MemoryDocumentStore {
            collections: RwLock::new(HashMap::new()),
            changes,
        }
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        MemoryDocumentStore::new(crate::DEFAULT_CHANGE_BUFFER)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn put_raw(&self, collection: &str, id: &str, owner_id: &str, body: Value) -> DbResult<()> {
        let previous = {
            let mut collections = self.collections.write().await;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(
                    id.to_string(),
                    Entry {
                        owner_id: owner_id.to_string(),
                        body,
                    },
                )
        };

        debug!(collection, id, owner_id, "Stored document in memory");
        notify(
            &self.changes,
            put_events(
                collection,
                id,
                owner_id,
                previous.as_ref().map(|e| e.owner_id.as_str()),
            ),
        );
        Ok(())
    }

    async fn get_raw(&self, collection: &str, id: &str) -> DbResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|entry| entry.body.clone()))
    }

    async fn delete_raw(&self, collection: &str, id: &str) -> DbResult<bool> {
        let removed = {
            let mut collections = self.collections.write().await;
            collections
                .get_mut(collection)
                .and_then(|docs| docs.remove(id))
        };

        match removed {
            Some(entry) => {
                notify(
                    &self.changes,
                    vec![ChangeEvent::delete(collection, id, &entry.owner_id)],
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_raw(&self, collection: &str, owner_id: &str) -> DbResult<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|entry| entry.owner_id == owner_id)
                    .map(|entry| entry.body.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
