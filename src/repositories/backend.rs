// src/repositories/backend.rs - the seam between the gateway and the backend SDK

use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

use crate::dtos::FileUpload;
use crate::models::{Account, Document, DocumentList, Session, StoredFile};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("backend error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        kind: Option<String>,
    },
    #[error("invalid url: {0}")]
    Url(String),
    #[error("other: {0}")]
    Other(String),
}

/// One filter in the ordered query list sent with a list call.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, Vec<Value>),
    Search(String, String),
    OrderDesc(String),
    Limit(u32),
    CursorAfter(String),
}

impl Query {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::Equal(attribute.to_string(), vec![value.into()])
    }

    pub fn search(attribute: &str, term: &str) -> Self {
        Query::Search(attribute.to_string(), term.to_string())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    pub fn limit(limit: u32) -> Self {
        Query::Limit(limit)
    }

    pub fn cursor_after(document_id: &str) -> Self {
        Query::CursorAfter(document_id.to_string())
    }

    /// The JSON query string the REST API expects in `queries[]`.
    pub fn to_json(&self) -> String {
        let value = match self {
            Query::Equal(attribute, values) => {
                json!({"method": "equal", "attribute": attribute, "values": values})
            }
            Query::Search(attribute, term) => {
                json!({"method": "search", "attribute": attribute, "values": [term]})
            }
            Query::OrderDesc(attribute) => json!({"method": "orderDesc", "attribute": attribute}),
            Query::Limit(limit) => json!({"method": "limit", "values": [limit]}),
            Query::CursorAfter(id) => json!({"method": "cursorAfter", "values": [id]}),
        };
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    pub width: u32,
    pub height: u32,
    /// Crop anchor as the preview endpoint spells it.
    pub gravity: &'static str,
    pub quality: u8,
}

impl PreviewOptions {
    /// Every post and avatar image is served through this preview.
    pub const POST_IMAGE: PreviewOptions = PreviewOptions {
        width: 2000,
        height: 2000,
        gravity: "top",
        quality: 100,
    };
}

/// Account, document and storage calls of the backend-as-a-service platform.
///
/// Each method is exactly one backend round-trip, except the URL builders
/// which are computed locally.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn create_account(
        &self,
        account_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, BackendError>;

    async fn create_email_session(&self, email: &str, password: &str)
    -> Result<Session, BackendError>;

    async fn get_account(&self) -> Result<Account, BackendError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError>;

    fn avatar_initials_url(&self, name: &str) -> Result<String, BackendError>;

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, BackendError>;

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, BackendError>;

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList<Document>, BackendError>;

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, BackendError>;

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), BackendError>;

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: &FileUpload,
    ) -> Result<StoredFile, BackendError>;

    fn file_preview_url(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> Result<String, BackendError>;

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<(), BackendError>;
}

/// Client-generated document and file id.
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
