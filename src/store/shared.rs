use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use super::{DocumentStore, StoreError};

type ConnectFuture = Pin<Box<dyn Future<Output = Result<Arc<dyn DocumentStore>, StoreError>> + Send>>;
type Connector = Box<dyn Fn() -> ConnectFuture + Send + Sync>;

/// The process-wide store client.
///
/// Connected on first use, reused by every request after that, and closed
/// once by [`shutdown`](SharedStore::shutdown) when the server stops.
/// Concurrent first requests wait on a single connection attempt. A failed
/// attempt leaves the cell empty so the next request tries again.
pub struct SharedStore {
    cell: OnceCell<Arc<dyn DocumentStore>>,
    connect: Connector,
}

impl SharedStore {
    /// Defers connecting until [`get`](SharedStore::get) is first called.
    pub fn lazy<F, Fut>(connect: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn DocumentStore>, StoreError>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            connect: Box::new(move || -> ConnectFuture { Box::pin(connect()) }),
        }
    }

    /// Wraps a store that is already connected.
    pub fn ready(store: Arc<dyn DocumentStore>) -> Self {
        let connected = Arc::clone(&store);
        Self {
            cell: OnceCell::new_with(Some(store)),
            connect: Box::new(move || -> ConnectFuture {
                let store = Arc::clone(&connected);
                Box::pin(async move { Ok::<_, StoreError>(store) })
            }),
        }
    }

    /// Returns the client, connecting first if no request has yet.
    pub async fn get(&self) -> Result<&Arc<dyn DocumentStore>, StoreError> {
        self.cell
            .get_or_try_init(|| async {
                let store = (self.connect)().await?;
                info!("document store connected");
                Ok::<_, StoreError>(store)
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }

    /// Closes the client if one was ever connected.
    pub async fn shutdown(&self) {
        if let Some(store) = self.cell.get() {
            store.close().await;
            info!("document store closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::SharedStore;
    use crate::store::{DocumentStore, MemoryStore, StoreError};

    #[tokio::test]
    async fn test_connects_once_on_first_use() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let shared = SharedStore::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>) }
        });

        assert!(!shared.is_connected());

        let (a, b) = tokio::join!(shared.get(), shared.get());
        assert!(Arc::ptr_eq(a.unwrap(), b.unwrap()));
        shared.get().await.unwrap();

        assert!(shared.is_connected());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let shared = SharedStore::lazy(move || {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(StoreError::Connect("metadata server unreachable".into()))
                } else {
                    Ok(Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>)
                }
            }
        });

        assert!(matches!(shared.get().await, Err(StoreError::Connect(_))));
        assert!(!shared.is_connected());
        assert!(shared.get().await.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_shutdown_closes_connected_store() {
        let shared = SharedStore::ready(Arc::new(MemoryStore::new()));
        let store = Arc::clone(shared.get().await.unwrap());

        shared.shutdown().await;

        assert!(matches!(store.delete("articles", "a1").await, Err(StoreError::Closed)));
    }

    #[tokio::test]
    async fn test_shutdown_without_connection_is_a_no_op() {
        let shared = SharedStore::lazy(|| async { Err(StoreError::Closed) });

        shared.shutdown().await;

        assert!(!shared.is_connected());
    }
}
