//! Bouquet store backed by a remote document database spoken to over HTTP.
//!
//! Writes need an actor identity obtained through anonymous sign-in. Until
//! one exists, `create` kicks off sign-in in the background and fails with
//! [`StoreError::PreconditionNotMet`] so the caller can retry shortly.
//!
//! Documents are created with a server-assigned `createTime`. A deployment
//! may lack the index needed to order the public query; with
//! `server_ordering` off, each page is re-sorted locally and marked
//! [`PageOrdering::PageLocal`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use petal_types::{Bouquet, BouquetId, DeliveryType, Flower, NewBouquet, Page, PageOrdering};

use crate::cursor;
use crate::store::{Backend, BouquetStore, ListOptions, StoreError, StoreResult};

const MAX_DOCUMENT_ID_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Document API root, e.g. `https://docs.example.com/v1/projects/petal`
    pub base_url: String,
    /// Identity API root used for anonymous sign-in
    pub auth_url: String,
    pub collection: String,
    /// Whether the backend can order the public query by `createTime`.
    pub server_ordering: bool,
    pub timeout: Duration,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>, auth_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_url: auth_url.into(),
            collection: "bouquets".into(),
            server_ordering: false,
            timeout: Duration::from_secs(10),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/documents/{}", self.base_url.trim_end_matches('/'), self.collection)
    }
}

#[derive(Debug, Clone)]
struct Session {
    actor_id: String,
    token: String,
}

#[derive(Clone)]
pub struct RemoteStore {
    inner: Arc<RemoteInner>,
}

struct RemoteInner {
    client: Client,
    config: RemoteConfig,
    session: RwLock<Option<Session>>,
    signing_in: AtomicBool,
    /// The page-local ordering warning is logged once per store.
    warned_unordered: AtomicBool,
}

impl RemoteStore {
    pub fn new(config: RemoteConfig) -> StoreResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            inner: Arc::new(RemoteInner {
                client,
                config,
                session: RwLock::new(None),
                signing_in: AtomicBool::new(false),
                warned_unordered: AtomicBool::new(false),
            }),
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.inner.config
    }

    /// The signed-in actor, if sign-in has completed.
    pub async fn actor_id(&self) -> Option<String> {
        self.inner
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.actor_id.clone())
    }

    /// Sign in anonymously and keep the resulting token for writes.
    pub async fn sign_in_anonymously(&self) -> StoreResult<String> {
        let url = format!("{}/accounts:signUp", self.inner.config.auth_url.trim_end_matches('/'));
        let response = self
            .inner
            .client
            .post(&url)
            .json(&SignUpRequest { return_secure_token: true })
            .send()
            .await?;
        let body: SignUpResponse = check_status(response).await?.json().await?;

        info!("Signed in to remote store as {}", body.local_id);
        let actor_id = body.local_id.clone();
        *self.inner.session.write().await = Some(Session {
            actor_id: body.local_id,
            token: body.id_token,
        });
        Ok(actor_id)
    }

    /// Start anonymous sign-in without waiting for it. Concurrent calls while
    /// one attempt is running are no-ops.
    pub fn begin_sign_in(&self) {
        if self.inner.signing_in.swap(true, Ordering::AcqRel) {
            return;
        }

        let store = self.clone();
        tokio::spawn(async move {
            if let Err(e) = store.sign_in_anonymously().await {
                warn!("Anonymous sign-in failed: {}", e);
            }
            store.inner.signing_in.store(false, Ordering::Release);
        });
    }

    async fn forget_session(&self) {
        *self.inner.session.write().await = None;
    }
}

#[async_trait]
impl BouquetStore for RemoteStore {
    fn backend(&self) -> Backend {
        Backend::Remote
    }

    async fn create(&self, data: NewBouquet) -> StoreResult<BouquetId> {
        let session = self.inner.session.read().await.clone();
        let Some(session) = session else {
            self.begin_sign_in();
            return Err(StoreError::precondition("sign-in in progress, retry shortly"));
        };

        let delivery_type = data.delivery_type;
        let response = self
            .inner
            .client
            .post(self.inner.config.collection_url())
            .bearer_auth(&session.token)
            .json(&CreateDocument {
                fields: BouquetFields::from(data),
            })
            .send()
            .await?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!("Remote store rejected session for {}, signing in again", session.actor_id);
            self.forget_session().await;
            self.begin_sign_in();
            return Err(StoreError::precondition("session expired, retry shortly"));
        }

        let created: CreatedDocument = check_status(response).await?.json().await?;
        debug!(
            "Stored {} bouquet {} at {}",
            delivery_type, created.id, created.create_time
        );
        Ok(BouquetId::new(created.id))
    }

    async fn get(&self, id: &BouquetId) -> StoreResult<Option<Bouquet>> {
        if !is_document_id(id.as_str()) {
            return Ok(None);
        }

        let url = format!("{}/{}", self.inner.config.collection_url(), id);
        let response = self.inner.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: Document = check_status(response).await?.json().await?;
        Ok(Some(document.into_bouquet()))
    }

    async fn list_public(&self, options: ListOptions) -> StoreResult<Page> {
        let server_ordering = self.inner.config.server_ordering;
        let ordering = if server_ordering {
            PageOrdering::Global
        } else {
            PageOrdering::PageLocal
        };

        let start_after = options.cursor.as_ref().map(cursor::to_document).transpose()?;
        let limit = options.page_size();
        if limit == 0 {
            return Ok(Page::empty(ordering));
        }

        let query = QueryRequest {
            filter: FieldFilter {
                field: "deliveryType",
                op: "EQUAL",
                value: DeliveryType::Public.as_str(),
            },
            order_by: server_ordering.then_some(OrderBy {
                field: "createTime",
                direction: "DESCENDING",
            }),
            start_after,
            limit,
        };

        let url = format!("{}:query", self.inner.config.collection_url());
        let response = self.inner.client.post(&url).json(&query).send().await?;
        let mut documents = check_status(response).await?.json::<QueryResponse>().await?.documents;
        documents.truncate(limit as usize);

        // Resume point is the backend's last document, not the re-sorted one
        let next_cursor = if documents.len() == limit as usize {
            documents.last().map(|d| cursor::from_document(&d.id))
        } else {
            None
        };

        let mut items = Vec::with_capacity(documents.len());
        for document in documents {
            let bouquet = document.into_bouquet();
            if !bouquet.is_public() {
                warn!("Public query returned {} bouquet {}, skipping", bouquet.delivery_type, bouquet.id);
                continue;
            }
            items.push(bouquet);
        }

        if !server_ordering {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if !self.inner.warned_unordered.swap(true, Ordering::Relaxed) {
                warn!("Remote store has no server-side ordering; public pages are only sorted within each page");
            }
        }

        debug!("Listed {} public bouquets (more: {})", items.len(), next_cursor.is_some());
        Ok(Page {
            items,
            next_cursor,
            ordering,
        })
    }
}

async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Remote {
        status: status.as_u16(),
        body,
    })
}

/// Ids go into the request path, so only URL-safe ids are looked up.
fn is_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_DOCUMENT_ID_LEN
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: String,
    local_id: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowerDoc {
    id: String,
    name: String,
    slug: String,
    meaning: String,
    image_ref: String,
}

impl From<Flower> for FlowerDoc {
    fn from(f: Flower) -> Self {
        Self {
            id: f.id,
            name: f.name,
            slug: f.slug,
            meaning: f.meaning,
            image_ref: f.image_ref,
        }
    }
}

impl From<FlowerDoc> for Flower {
    fn from(f: FlowerDoc) -> Self {
        Self {
            id: f.id,
            name: f.name,
            slug: f.slug,
            meaning: f.meaning,
            image_ref: f.image_ref,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BouquetFields {
    flower: FlowerDoc,
    #[serde(default)]
    recipient_name: String,
    #[serde(default)]
    message: Option<String>,
    delivery_type: DeliveryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delivery_date: Option<DateTime<Utc>>,
}

impl From<NewBouquet> for BouquetFields {
    fn from(data: NewBouquet) -> Self {
        Self {
            flower: data.flower.into(),
            recipient_name: data.recipient_name,
            message: data.message,
            delivery_type: data.delivery_type,
            delivery_date: data.delivery_date,
        }
    }
}

#[derive(Serialize)]
struct CreateDocument {
    fields: BouquetFields,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    id: String,
    create_time: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    id: String,
    create_time: DateTime<Utc>,
    fields: BouquetFields,
}

impl Document {
    fn into_bouquet(self) -> Bouquet {
        Bouquet {
            id: BouquetId::new(self.id),
            flower: self.fields.flower.into(),
            recipient_name: self.fields.recipient_name,
            message: self.fields.message,
            delivery_type: self.fields.delivery_type,
            delivery_date: self.fields.delivery_date,
            created_at: self.create_time,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    #[serde(rename = "where")]
    filter: FieldFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_after: Option<String>,
    limit: u32,
}

#[derive(Serialize)]
struct FieldFilter {
    field: &'static str,
    op: &'static str,
    value: &'static str,
}

#[derive(Serialize)]
struct OrderBy {
    field: &'static str,
    direction: &'static str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Vec<Document>,
}
