//! Firestore over its REST API.
//!
//! | Operation | Request |
//! |---|---|
//! | list | `GET    {base}/{collection}?pageSize=…&pageToken=…` |
//! | create | `POST   {base}/{collection}?documentId={key}` |
//! | upsert | `PATCH  {base}/{collection}/{key}` (no update mask: replace all) |
//! | delete | `DELETE {base}/{collection}/{key}` |
//!
//! where `{base}` is
//! `https://firestore.googleapis.com/v1/projects/{project}/databases/{database}/documents`.
//!
//! A create that collides answers `409 ALREADY_EXISTS`; a delete of a missing
//! document answers `200`. Both behaviors are what the trait promises, so no
//! extra reads are needed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::value::{decode_fields, encode_fields, Fields};
use super::{Document, DocumentStore, DocumentStream, StoreError};

const PRODUCTION_HOST: &str = "https://firestore.googleapis.com";
const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";
const PAGE_SIZE: &str = "300";
// Refresh metadata tokens this long before Google says they expire.
const TOKEN_SLACK: Duration = Duration::from_secs(60);

/// How to reach a Firestore database.
#[derive(Clone, Debug, PartialEq)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database: String,
    /// `host:port` of a local emulator. Switches to plain HTTP and the
    /// emulator's `owner` credential.
    pub emulator_host: Option<String>,
    /// A fixed bearer token. Without one, tokens come from the GCE metadata
    /// server.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: "(default)".to_owned(),
            emulator_host: None,
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    fn documents_url(&self) -> Result<Url, StoreError> {
        let host = match &self.emulator_host {
            Some(host) => format!("http://{host}"),
            None => PRODUCTION_HOST.to_owned(),
        };
        let mut url = Url::parse(&host).map_err(|e| StoreError::Connect(Box::new(e)))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::Connect(format!("`{host}` cannot be a base url").into()))?
            .extend(["v1", "projects", self.project_id.as_str(), "databases", self.database.as_str(), "documents"]);
        Ok(url)
    }
}

enum Credentials {
    Static(String),
    Metadata(Mutex<Option<CachedToken>>),
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

#[derive(Serialize)]
struct WriteBody {
    fields: Fields,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPage {
    #[serde(default)]
    documents: Vec<WireDocument>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct WireDocument {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: Fields,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorStatus,
}

#[derive(Deserialize)]
struct ErrorStatus {
    #[serde(default)]
    message: String,
}

/// A [`DocumentStore`] backed by Cloud Firestore.
pub struct FirestoreStore {
    client: Client,
    credentials: Credentials,
    documents_url: Url,
    closed: AtomicBool,
}

impl FirestoreStore {
    /// Builds the HTTP client. No request is made until the first operation.
    pub fn connect(config: &FirestoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Connect(Box::new(e)))?;

        let credentials = match (&config.access_token, &config.emulator_host) {
            (Some(token), _) => Credentials::Static(token.clone()),
            (None, Some(_)) => Credentials::Static("owner".to_owned()),
            (None, None) => Credentials::Metadata(Mutex::new(None)),
        };

        Ok(Self {
            client,
            credentials,
            documents_url: config.documents_url()?,
            closed: AtomicBool::new(false),
        })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.documents_url.clone();
        // `documents_url` was checked to be a base url in `connect`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    async fn bearer_token(&self) -> Result<String, StoreError> {
        let cache = match &self.credentials {
            Credentials::Static(token) => return Ok(token.clone()),
            Credentials::Metadata(cache) => cache,
        };

        let mut cached = cache.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.refresh_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        let response = self
            .client
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| StoreError::Connect(Box::new(e)))?;
        let token: MetadataToken = check(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Connect(Box::new(e)))?;

        debug!(expires_in = token.expires_in, "fetched firestore access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_SLACK);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }
        let token = self.bearer_token().await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn list_page(&self, collection: &str, page_token: &str) -> Result<ListPage, StoreError> {
        let mut url = self.url(&[collection]);
        url.query_pairs_mut().append_pair("pageSize", PAGE_SIZE);
        if !page_token.is_empty() {
            url.query_pairs_mut().append_pair("pageToken", page_token);
        }

        let response = send(self.request(Method::GET, url).await?).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Malformed(format!("list response: {e}")))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn list_all<'a>(&'a self, collection: &'a str) -> DocumentStream<'a> {
        // `Some("")` fetches the first page; `None` means the last page is in.
        let pages = stream::try_unfold(Some(String::new()), move |page_token| async move {
            let Some(page_token) = page_token else {
                return Ok(None);
            };
            let page = self.list_page(collection, &page_token).await?;
            let next = page.next_page_token.filter(|token| !token.is_empty());
            Ok::<_, StoreError>(Some((page.documents, next)))
        });

        pages
            .map_ok(|documents| stream::iter(documents.into_iter().map(decode_document)))
            .try_flatten()
            .boxed()
    }

    async fn create(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        let mut url = self.url(&[collection]);
        url.query_pairs_mut().append_pair("documentId", key);

        let request = self.request(Method::POST, url).await?;
        match send(request.json(&WriteBody { fields: encode_fields(document) })).await {
            Err(StoreError::Rejected { status, .. }) if status == StatusCode::CONFLICT.as_u16() => {
                Err(StoreError::AlreadyExists {
                    collection: collection.to_owned(),
                    key: key.to_owned(),
                })
            }
            result => result.map(drop),
        }
    }

    async fn upsert(&self, collection: &str, key: &str, document: Document) -> Result<(), StoreError> {
        let request = self.request(Method::PATCH, self.url(&[collection, key])).await?;
        send(request.json(&WriteBody { fields: encode_fields(document) })).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        send(self.request(Method::DELETE, self.url(&[collection, key])).await?).await?;
        Ok(())
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

fn decode_document(document: WireDocument) -> Result<Document, StoreError> {
    decode_fields(document.fields)
        .map_err(|e| StoreError::Malformed(format!("document `{}`: {e}", document.name)))
}

async fn send(request: RequestBuilder) -> Result<reqwest::Response, StoreError> {
    let response = request
        .send()
        .await
        .map_err(|e| StoreError::Transport(Box::new(e)))?;
    check(response).await
}

/// Turns a non-2xx answer into [`StoreError::Rejected`], keeping Google's
/// error message when the body has one.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);

    Err(StoreError::Rejected { status: status.as_u16(), message })
}
