//! The document store collaborator.
//!
//! Articles live in a schemaless store addressed by collection + key. The
//! endpoint only ever needs four operations, and the difference between two
//! of them is the whole point:
//!
//! | Operation | Key present | Key absent |
//! |---|---|---|
//! | [`create`](DocumentStore::create) | [`StoreError::AlreadyExists`] | insert |
//! | [`upsert`](DocumentStore::upsert) | replace every field | insert |
//! | [`delete`](DocumentStore::delete) | remove | no-op, still `Ok` |
//! | [`list_all`](DocumentStore::list_all) | lazy stream, may fail mid-way | |
//!
//! Two backends ship with the crate: [`FirestoreStore`] for deployments and
//! [`MemoryStore`] for local runs and tests. [`SharedStore`] owns whichever
//! one is configured for the lifetime of the process.

mod firestore;
mod memory;
mod shared;
mod value;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;
pub use shared::SharedStore;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::error::BoxError;

/// The raw field map of one stored document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Every document of a collection, fetched lazily.
pub type DocumentStream<'a> = BoxStream<'a, Result<Document, StoreError>>;

/// Failures reported by a [`DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document `{key}` already exists in `{collection}`")]
    AlreadyExists { collection: String, key: String },

    #[error("store client is closed")]
    Closed,

    #[error("connecting to the store failed: {0}")]
    Connect(#[source] BoxError),

    #[error("store request failed: {0}")]
    Transport(#[source] BoxError),

    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed store response: {0}")]
    Malformed(String),
}

/// Single-document operations over a keyed collection.
///
/// Implementations must be safe to share across concurrent requests; the
/// store itself is responsible for ordering concurrent writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Streams every document in `collection` in the store's own order.
    fn list_all<'a>(&'a self, collection: &'a str) -> DocumentStream<'a>;

    /// Inserts `document` at `key`, failing with
    /// [`StoreError::AlreadyExists`] if the key is taken.
    async fn create(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError>;

    /// Replaces the document at `key` wholesale, inserting it if absent.
    async fn upsert(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError>;

    /// Removes the document at `key`. Absent keys are not an error.
    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Releases the client. Every later operation fails with
    /// [`StoreError::Closed`].
    async fn close(&self);
}
