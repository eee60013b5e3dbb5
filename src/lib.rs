//! # articles
//!
//! A single HTTP endpoint that lists, creates, replaces and deletes
//! storefront articles kept in a document store.
//!
//! ## The contract
//!
//! | Method | Body | Success | Failure |
//! |---|---|---|---|
//! | `OPTIONS` | none | `204` + CORS headers | |
//! | `GET` | none | `200` + JSON array | `500` |
//! | `POST` | article | `201` | `400`, `409` duplicate id, `500` |
//! | `PUT` | article | `200` | `400`, `500` |
//! | `DELETE` | `{"id": …}` | `200` | `400`, `500` |
//! | anything else | | | `404 UNSUPPORTED METHOD` |
//!
//! Every response carries `Access-Control-Allow-Origin: *`. Error responses
//! carry a status and nothing else; the detail goes to the log.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use articles::{health, ArticlesApi, MemoryStore, Router, Server, SharedStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), articles::Error> {
//!     let store = Arc::new(SharedStore::ready(Arc::new(MemoryStore::new())));
//!
//!     let app = Router::new()
//!         .route("/healthz", health::liveness)
//!         .route("/readyz", health::readiness(Arc::clone(&store)))
//!         .fallback(ArticlesApi::new(Arc::clone(&store), "articles").into_handler());
//!
//!     Server::bind("127.0.0.1:8080".parse().unwrap()).await?.serve(app).await?;
//!     store.shutdown().await;
//!     Ok(())
//! }
//! ```

mod api;
mod article;
mod config;
mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;
pub mod store;

pub use api::ArticlesApi;
pub use article::{Article, DeleteRequest};
pub use config::{Config, StoreConfig};
pub use error::{ApiError, BoxError, Error};
pub use handler::Handler;
pub use method::Method;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use store::{DocumentStore, FirestoreConfig, FirestoreStore, MemoryStore, SharedStore, StoreError};
