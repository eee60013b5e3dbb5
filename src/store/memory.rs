use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::RwLock;

use super::{Document, DocumentStore, DocumentStream, StoreError};

/// An in-process [`DocumentStore`].
///
/// Collections are ordered by key, so listing is deterministic. Nothing is
/// persisted; the data lives exactly as long as the value.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn list_all<'a>(&'a self, collection: &'a str) -> DocumentStream<'a> {
        let snapshot = async move {
            self.ensure_open()?;
            let collections = self.collections.read().await;
            let documents: Vec<Document> = collections
                .get(collection)
                .map(|docs| docs.values().cloned().collect())
                .unwrap_or_default();
            Ok::<_, StoreError>(documents)
        };

        stream::once(snapshot)
            .flat_map(|result| match result {
                Ok(documents) => stream::iter(documents.into_iter().map(Ok::<_, StoreError>)).left_stream(),
                Err(error) => stream::once(async move { Err(error) }).right_stream(),
            })
            .boxed()
    }

    async fn create(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_owned()).or_default();

        if docs.contains_key(key) {
            return Err(StoreError::AlreadyExists {
                collection: collection.to_owned(),
                key: key.to_owned(),
            });
        }

        docs.insert(key.to_owned(), document);
        Ok(())
    }

    async fn upsert(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.collections
            .write()
            .await
            .entry(collection.to_owned())
            .or_default()
            .insert(key.to_owned(), document);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.ensure_open()?;
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(key);
        }
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use futures_util::TryStreamExt;
    use serde_json::json;

    use super::MemoryStore;
    use crate::store::{Document, DocumentStore, StoreError};

    fn doc(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    async fn list(store: &MemoryStore, collection: &str) -> Vec<Document> {
        store.list_all(collection).try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_is_exclusive() {
        let store = MemoryStore::new();

        store.create("articles", "a1", doc(json!({"name": "Widget"}))).await.unwrap();
        let err = store
            .create("articles", "a1", doc(json!({"name": "Gadget"})))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists { ref key, .. } if key == "a1"));
        assert_eq!(list(&store, "articles").await, vec![doc(json!({"name": "Widget"}))]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_whole_document() {
        let store = MemoryStore::new();

        store.upsert("articles", "a1", doc(json!({"name": "Widget", "year": "1999"}))).await.unwrap();
        store.upsert("articles", "a1", doc(json!({"name": "Gadget"}))).await.unwrap();

        assert_eq!(list(&store, "articles").await, vec![doc(json!({"name": "Gadget"}))]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryStore::new();

        store.create("articles", "a1", Document::new()).await.unwrap();
        store.delete("articles", "a1").await.unwrap();
        store.delete("articles", "a1").await.unwrap();
        store.delete("missing", "a1").await.unwrap();

        assert!(list(&store, "articles").await.is_empty());
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_key_and_scoped_to_collection() {
        let store = MemoryStore::new();

        store.create("articles", "b", doc(json!({"id": "b"}))).await.unwrap();
        store.create("articles", "a", doc(json!({"id": "a"}))).await.unwrap();
        store.create("drafts", "c", doc(json!({"id": "c"}))).await.unwrap();

        assert_eq!(
            list(&store, "articles").await,
            vec![doc(json!({"id": "a"})), doc(json!({"id": "b"}))]
        );
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = MemoryStore::new();
        store.close().await;

        assert!(matches!(
            store.upsert("articles", "a1", Document::new()).await,
            Err(StoreError::Closed)
        ));
        assert!(matches!(
            store.list_all("articles").try_collect::<Vec<_>>().await,
            Err(StoreError::Closed)
        ));
    }
}
