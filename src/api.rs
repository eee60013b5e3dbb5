//! The articles endpoint.
//!
//! One handler, dispatched on method:
//!
//! | Method | Body | Store operation | Success |
//! |---|---|---|---|
//! | `OPTIONS` | none | none | `204` + CORS pre-flight headers |
//! | `GET` | none | `list_all` | `200` + JSON array |
//! | `POST` | [`Article`] | `create` | `201` |
//! | `PUT` | [`Article`] | `upsert` | `200` |
//! | `DELETE` | [`DeleteRequest`] | `delete` | `200` |
//! | other | any | none | `404 UNSUPPORTED METHOD` |
//!
//! Bodies are parsed and validated before the store is touched, so a bad
//! request never connects, let alone mutates.

use std::sync::Arc;

use futures_util::TryStreamExt;
use http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::article::{Article, DeleteRequest};
use crate::error::ApiError;
use crate::handler::Handler;
use crate::method::Method;
use crate::middleware::cors;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::store::{Document, DocumentStore, SharedStore};

/// CRUD over one collection of articles.
pub struct ArticlesApi {
    store: Arc<SharedStore>,
    collection: String,
}

impl ArticlesApi {
    pub fn new(store: Arc<SharedStore>, collection: impl Into<String>) -> Self {
        Self { store, collection: collection.into() }
    }

    /// Wraps the endpoint for [`Router::fallback`](crate::Router::fallback).
    pub fn into_handler(self) -> impl Handler {
        let api = Arc::new(self);
        move |req: Request| {
            let api = Arc::clone(&api);
            async move { api.handle(req).await }
        }
    }

    /// Answers one request. Every response allows any origin.
    pub async fn handle(&self, req: Request) -> Response {
        let response = match Method::try_from(req.method()) {
            Ok(Method::Options) => return cors::preflight(),
            Ok(Method::Get) => self.list().await.into_response(),
            Ok(Method::Post) => self.create(req).await.into_response(),
            Ok(Method::Put) => self.update(req).await.into_response(),
            Ok(Method::Delete) => self.delete(req).await.into_response(),
            Err(()) => ApiError::UnsupportedMethod(req.method().clone()).into_response(),
        };

        cors::allow_any_origin(response)
    }

    async fn store(&self) -> Result<&dyn DocumentStore, ApiError> {
        Ok(&**self.store.get().await?)
    }

    async fn list(&self) -> Result<Response, ApiError> {
        let store = self.store().await?;

        // Buffered so a failure halfway through still yields a clean 500.
        let articles: Vec<Article> = store
            .list_all(&self.collection)
            .map_err(ApiError::from)
            .and_then(|document| async move { Article::from_document(document).map_err(ApiError::Decode) })
            .try_collect()
            .await?;

        debug!(count = articles.len(), "listed articles");

        let body = serde_json::to_vec(&articles).map_err(ApiError::Encode)?;
        Ok(Response::json(body))
    }

    async fn create(&self, req: Request) -> Result<StatusCode, ApiError> {
        let article: Article = read_json(req).await?;
        let key = require_id(&article.id)?.to_owned();

        self.store()
            .await?
            .create(&self.collection, &key, Document::from(article))
            .await?;

        debug!(id = %key, "created article");
        Ok(StatusCode::CREATED)
    }

    async fn update(&self, req: Request) -> Result<StatusCode, ApiError> {
        let article: Article = read_json(req).await?;
        let key = require_id(&article.id)?.to_owned();

        self.store()
            .await?
            .upsert(&self.collection, &key, Document::from(article))
            .await?;

        debug!(id = %key, "replaced article");
        Ok(StatusCode::OK)
    }

    async fn delete(&self, req: Request) -> Result<StatusCode, ApiError> {
        let body: DeleteRequest = read_json(req).await?;
        let key = require_id(&body.id)?;

        self.store().await?.delete(&self.collection, key).await?;

        debug!(id = %key, "deleted article");
        Ok(StatusCode::OK)
    }
}

async fn read_json<T: DeserializeOwned>(req: Request) -> Result<T, ApiError> {
    let body = req.bytes().await.map_err(ApiError::BodyRead)?;
    serde_json::from_slice(&body).map_err(ApiError::Payload)
}

fn require_id(id: &str) -> Result<&str, ApiError> {
    if id.is_empty() { Err(ApiError::MissingId) } else { Ok(id) }
}
