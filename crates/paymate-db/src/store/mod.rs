//! # Document Store
//!
//! Owner-scoped JSON documents with live snapshot subscriptions.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repositories (invoice, payroll, leave, ledger, profile)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Collection<T: Document>     ← typed put/get/list/subscribe             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  dyn DocumentStore           ← raw JSON, one trait, two backends        │
//! │       ├── SqliteDocumentStore  (documents table, sqlx)                  │
//! │       └── MemoryDocumentStore  (in-process maps)                        │
//! │       │                                                                 │
//! │       └── broadcast::Sender<ChangeEvent> ──► every subscriber           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Subscriptions
//! `subscribe(owner)` yields the owner's full collection once immediately,
//! then again after every write or delete touching that owner's documents in
//! that collection. A subscriber that falls behind the change channel gets a
//! fresh snapshot rather than an error.

pub mod documents;
pub mod memory;
pub mod sqlite;

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future;
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::error::{DbError, DbResult};

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

// =============================================================================
// Document
// =============================================================================

/// A record that lives in a collection and belongs to one owner.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name, e.g. `"invoices"`.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// The enterprise (or solo user) the record is scoped to.
    fn owner_id(&self) -> &str;
}

// =============================================================================
// Change Events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Put,
    Delete,
}

/// Emitted by a store after every successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: String,
    pub id: String,
    pub owner_id: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn put(collection: &str, id: &str, owner_id: &str) -> Self {
        ChangeEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            kind: ChangeKind::Put,
        }
    }

    pub fn delete(collection: &str, id: &str, owner_id: &str) -> Self {
        ChangeEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            owner_id: owner_id.to_string(),
            kind: ChangeKind::Delete,
        }
    }

    fn touches(&self, collection: &str, owner_id: &str) -> bool {
        self.collection == collection && self.owner_id == owner_id
    }
}

/// Sends `events` to current subscribers. No subscribers is not an error.
pub(crate) fn notify(sender: &broadcast::Sender<ChangeEvent>, events: Vec<ChangeEvent>) {
    for event in events {
        let _ = sender.send(event);
    }
}

/// Events for a put that may have moved a document between owners.
pub(crate) fn put_events(
    collection: &str,
    id: &str,
    owner_id: &str,
    previous_owner: Option<&str>,
) -> Vec<ChangeEvent> {
    let mut events = vec![ChangeEvent::put(collection, id, owner_id)];
    if let Some(previous) = previous_owner.filter(|p| *p != owner_id) {
        events.push(ChangeEvent::delete(collection, id, previous));
    }
    events
}

// =============================================================================
// Document Store
// =============================================================================

/// Backend contract. Bodies are untyped JSON; [`Collection`] adds types.
///
/// Writes are last-writer-wins. Listing order is by document id.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Inserts or replaces a document.
    async fn put_raw(&self, collection: &str, id: &str, owner_id: &str, body: Value) -> DbResult<()>;

    async fn get_raw(&self, collection: &str, id: &str) -> DbResult<Option<Value>>;

    /// Returns `false` when there was nothing to delete.
    async fn delete_raw(&self, collection: &str, id: &str) -> DbResult<bool>;

    /// All documents in `collection` owned by `owner_id`.
    async fn list_raw(&self, collection: &str, owner_id: &str) -> DbResult<Vec<Value>>;

    /// A receiver for every change made after this call.
    fn changes(&self) -> broadcast::Receiver<ChangeEvent>;
}

// =============================================================================
// Typed Collection
// =============================================================================

/// Typed view over one collection of a store.
pub struct Collection<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T>
where
    T: Document,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &T::COLLECTION)
            .finish()
    }
}

impl<T: Document> Collection<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Collection {
            store,
            _marker: PhantomData,
        }
    }

    pub async fn put(&self, doc: &T) -> DbResult<()> {
        let body = serde_json::to_value(doc)?;
        self.store
            .put_raw(T::COLLECTION, doc.id(), doc.owner_id(), body)
            .await
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<T>> {
        match self.store.get_raw(T::COLLECTION, id).await? {
            Some(body) => Ok(Some(serde_json::from_value(body)?)),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get), but a missing document is an error.
    pub async fn require(&self, id: &str) -> DbResult<T> {
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found(T::COLLECTION, id))
    }

    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        self.store.delete_raw(T::COLLECTION, id).await
    }

    pub async fn list(&self, owner_id: &str) -> DbResult<Vec<T>> {
        self.store
            .list_raw(T::COLLECTION, owner_id)
            .await?
            .into_iter()
            .map(|body| serde_json::from_value(body).map_err(DbError::from))
            .collect()
    }

    /// Live snapshots of `owner_id`'s documents in this collection.
    ///
    /// The first item is the current snapshot. The stream keeps the store
    /// alive and runs until it is dropped.
    pub fn subscribe(&self, owner_id: &str) -> BoxStream<'static, DbResult<Vec<T>>> {
        let owner = owner_id.to_string();
        let triggers = self.triggers(move |event| event.touches(T::COLLECTION, &owner));

        let collection = self.clone();
        let owner = owner_id.to_string();
        triggers
            .then(move |()| {
                let collection = collection.clone();
                let owner = owner.clone();
                async move { collection.list(&owner).await }
            })
            .boxed()
    }

    /// Live view of a single document; `None` while it does not exist.
    pub fn watch(&self, id: &str) -> BoxStream<'static, DbResult<Option<T>>> {
        let watched = id.to_string();
        let triggers = self.triggers(move |event| {
            event.collection == T::COLLECTION && event.id == watched
        });

        let collection = self.clone();
        let id = id.to_string();
        triggers
            .then(move |()| {
                let collection = collection.clone();
                let id = id.clone();
                async move { collection.get(&id).await }
            })
            .boxed()
    }

    /// One tick now, then one per relevant change. The receiver is taken
    /// before the first tick so no change between the two is missed.
    fn triggers<F>(&self, relevant: F) -> BoxStream<'static, ()>
    where
        F: Fn(&ChangeEvent) -> bool + Send + 'static,
    {
        let changes = BroadcastStream::new(self.store.changes()).filter_map(move |event| {
            let tick = match event {
                Ok(event) => relevant(&event),
                // Lagged: some events were dropped, resend the snapshot.
                Err(_) => true,
            };
            future::ready(tick.then_some(()))
        });

        stream::once(future::ready(())).chain(changes).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use paymate_core::ledger::{Transaction, TransactionKind};
    use std::time::Duration;
    use tokio::time::timeout;

    fn tx(owner: &str, amount: f64) -> Transaction {
        Transaction::new(
            TransactionKind::Income,
            amount,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            "Sales",
            owner,
        )
    }

    async fn next<S, T>(stream: &mut S) -> T
    where
        S: futures_util::Stream<Item = DbResult<T>> + Unpin,
    {
        timeout(Duration::from_secs(2), stream.next())
            .await
            .expect("no snapshot within timeout")
            .expect("stream ended")
            .expect("snapshot failed")
    }

    async fn exercise_subscribe(store: Arc<dyn DocumentStore>) {
        let ledger: Collection<Transaction> = Collection::new(store);
        let first = tx("ent-1", 100.0);
        ledger.put(&first).await.unwrap();

        let mut live = ledger.subscribe("ent-1");
        assert_eq!(next(&mut live).await.len(), 1);

        // Another owner's write does not tick; the next snapshot is ours.
        ledger.put(&tx("ent-2", 5.0)).await.unwrap();
        let second = tx("ent-1", 50.0);
        ledger.put(&second).await.unwrap();
        let snapshot = next(&mut live).await;
        assert_eq!(snapshot.len(), 2);

        ledger.delete(&first.id).await.unwrap();
        let snapshot = next(&mut live).await;
        assert_eq!(snapshot, vec![second]);
    }

    #[tokio::test]
    async fn test_subscribe_memory_store() {
        exercise_subscribe(Arc::new(MemoryDocumentStore::default())).await;
    }

    #[tokio::test]
    async fn test_subscribe_sqlite_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        exercise_subscribe(db.document_store()).await;
    }

    #[tokio::test]
    async fn test_watch_single_document() {
        let ledger: Collection<Transaction> =
            Collection::new(Arc::new(MemoryDocumentStore::default()));
        let mut entry = tx("ent-1", 10.0);

        let mut live = ledger.watch(&entry.id);
        assert_eq!(next(&mut live).await, None);

        ledger.put(&entry).await.unwrap();
        assert_eq!(next(&mut live).await, Some(entry.clone()));

        entry.amount = 20.0;
        ledger.put(&entry).await.unwrap();
        assert_eq!(next(&mut live).await.map(|t| t.amount), Some(20.0));

        ledger.delete(&entry.id).await.unwrap();
        assert_eq!(next(&mut live).await, None);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_resyncs() {
        let store = Arc::new(MemoryDocumentStore::new(2));
        let ledger: Collection<Transaction> = Collection::new(store);

        let mut live = ledger.subscribe("ent-1");
        assert!(next(&mut live).await.is_empty());

        for n in 0..5 {
            ledger.put(&tx("ent-1", n as f64)).await.unwrap();
        }

        // Whatever was dropped, the snapshot after the lag is complete.
        let snapshot = next(&mut live).await;
        assert_eq!(snapshot.len(), 5);
    }

    #[test]
    fn test_put_events_for_owner_move() {
        let events = put_events("claims", "c1", "ent-2", Some("ent-1"));
        assert_eq!(
            events,
            vec![
                ChangeEvent::put("claims", "c1", "ent-2"),
                ChangeEvent::delete("claims", "c1", "ent-1"),
            ]
        );
        assert_eq!(put_events("claims", "c1", "ent-2", Some("ent-2")).len(), 1);
    }
}
