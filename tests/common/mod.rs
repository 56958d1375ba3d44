#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Map, Value, json};

use aigram::cache::{CacheConfig, QueryCache};
use aigram::dtos::FileUpload;
use aigram::models::{Account, Document, DocumentList, Session, StoredFile};
use aigram::queries::Queries;
use aigram::repositories::{Backend, BackendError, PreviewOptions, Query};
use aigram::services::{CollectionIds, Gateway};

pub const DATABASE: &str = "db";
pub const BUCKET: &str = "media";
pub const USERS: &str = "users";
pub const POSTS: &str = "posts";
pub const SAVES: &str = "saves";

pub fn ids() -> CollectionIds {
    CollectionIds {
        database_id: DATABASE.into(),
        storage_id: BUCKET.into(),
        user_collection_id: USERS.into(),
        post_collection_id: POSTS.into(),
        saves_collection_id: SAVES.into(),
    }
}

pub fn gateway(backend: &Arc<MockBackend>) -> Gateway {
    let backend: Arc<dyn Backend> = backend.clone();
    Gateway::new(backend, ids())
}

pub fn queries(backend: &Arc<MockBackend>) -> Queries {
    Queries::new(gateway(backend), QueryCache::new(CacheConfig::default()))
}

pub fn png() -> FileUpload {
    FileUpload::new("photo.png", mime::IMAGE_PNG, vec![0x89, b'P', b'N', b'G'])
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Document>>,
    files: HashMap<String, StoredFile>,
    accounts: Vec<(Account, String)>,
    session: Option<String>,
    ticks: i64,
}

impl State {
    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(self.ticks)
    }
}

/// In-memory stand-in for the backend. Counts every call by method name and
/// fails any method named in [`MockBackend::fail`].
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<State>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn fail(&self, method: &'static str) {
        self.failing.lock().unwrap().insert(method);
    }

    pub fn recover(&self, method: &'static str) {
        self.failing.lock().unwrap().remove(method);
    }

    pub fn has_file(&self, file_id: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(file_id)
    }

    pub fn seed_file(&self, file_id: &str) {
        let stored = StoredFile {
            id: file_id.to_string(),
            bucket_id: BUCKET.to_string(),
            name: format!("{file_id}.png"),
            mime_type: Some("image/png".into()),
            size_original: 4,
        };
        let mut state = self.state.lock().unwrap();
        state.files.insert(file_id.to_string(), stored);
    }

    pub fn file_count(&self) -> usize {
        self.state.lock().unwrap().files.len()
    }

    pub fn documents(&self, collection: &str) -> Vec<Document> {
        let state = self.state.lock().unwrap();
        state.collections.get(collection).cloned().unwrap_or_default()
    }

    /// Inserts a document directly, bypassing call counting.
    pub fn seed(&self, collection: &str, id: &str, fields: Value) -> Document {
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let mut doc = Document::new(id, as_map(fields));
        doc.collection_id = Some(collection.to_string());
        doc.database_id = Some(DATABASE.to_string());
        doc.created_at = Some(now);
        doc.updated_at = Some(now);
        state
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        doc
    }

    pub fn seed_post(&self, id: &str, creator: &str, caption: &str) -> Document {
        self.seed(
            POSTS,
            id,
            json!({
                "creator": creator,
                "caption": caption,
                "imageUrl": format!("mock://{BUCKET}/{id}-img/preview"),
                "imageId": format!("{id}-img"),
                "tags": [],
                "likes": []
            }),
        )
    }

    /// An account with a users-collection document, signed in.
    pub fn seed_signed_in_user(&self, user_id: &str, account_id: &str) -> Document {
        {
            let mut state = self.state.lock().unwrap();
            let account = Account {
                id: account_id.to_string(),
                name: "Ana Lima".into(),
                email: format!("{account_id}@example.com"),
                created_at: None,
            };
            state.accounts.push((account, "secret".into()));
            state.session = Some(account_id.to_string());
        }
        self.seed(
            USERS,
            user_id,
            json!({
                "accountId": account_id,
                "name": "Ana Lima",
                "username": "ana",
                "email": format!("{account_id}@example.com"),
                "save": []
            }),
        )
    }

    fn record(&self, method: &'static str) -> Result<(), BackendError> {
        *self.calls.lock().unwrap().entry(method).or_default() += 1;
        if self.failing.lock().unwrap().contains(method) {
            return Err(BackendError::Api {
                status: 500,
                message: format!("{method} failed"),
                kind: Some("general_unknown".into()),
            });
        }
        Ok(())
    }
}

fn as_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn not_found(what: &str) -> BackendError {
    BackendError::Api {
        status: 404,
        message: format!("{what} not found"),
        kind: Some("document_not_found".into()),
    }
}

fn field_ids(value: Option<&Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items.iter().flat_map(|v| field_ids(Some(v))).collect(),
        Some(Value::Object(obj)) => obj.get("$id").cloned().into_iter().collect(),
        Some(other) => vec![other.clone()],
        None => Vec::new(),
    }
}

fn apply(mut docs: Vec<Document>, queries: &[Query]) -> DocumentList<Document> {
    let mut limit = None;
    let mut cursor = None;
    for query in queries {
        match query {
            Query::Equal(attribute, values) => {
                docs.retain(|doc| {
                    field_ids(doc.field(attribute))
                        .iter()
                        .any(|v| values.contains(v))
                });
            }
            Query::Search(attribute, term) => {
                let term = term.to_lowercase();
                docs.retain(|doc| {
                    doc.field(attribute)
                        .and_then(Value::as_str)
                        .is_some_and(|text| text.to_lowercase().contains(&term))
                });
            }
            Query::OrderDesc(attribute) => match attribute.as_str() {
                "$createdAt" => docs.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
                "$updatedAt" => docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
                other => panic!("mock cannot order by {other}"),
            },
            Query::Limit(n) => limit = Some(*n as usize),
            Query::CursorAfter(id) => cursor = Some(id.clone()),
        }
    }

    let total = docs.len() as u64;
    if let Some(cursor) = cursor {
        match docs.iter().position(|doc| doc.id == cursor) {
            Some(at) => docs.drain(..=at).for_each(drop),
            None => docs.clear(),
        }
    }
    if let Some(limit) = limit {
        docs.truncate(limit);
    }
    DocumentList {
        total,
        documents: docs,
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn create_account(
        &self,
        account_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, BackendError> {
        self.record("create_account")?;
        let mut state = self.state.lock().unwrap();
        if state.accounts.iter().any(|(a, _)| a.email == email) {
            return Err(BackendError::Api {
                status: 409,
                message: "user already exists".into(),
                kind: Some("user_already_exists".into()),
            });
        }
        let account = Account {
            id: account_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Some(state.now()),
        };
        state.accounts.push((account.clone(), password.to_string()));
        Ok(account)
    }

    async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        self.record("create_email_session")?;
        let mut state = self.state.lock().unwrap();
        let account_id = state
            .accounts
            .iter()
            .find(|(a, p)| a.email == email && p == password)
            .map(|(a, _)| a.id.clone())
            .ok_or(BackendError::Api {
                status: 401,
                message: "invalid credentials".into(),
                kind: Some("user_invalid_credentials".into()),
            })?;
        state.session = Some(account_id.clone());
        Ok(Session {
            id: format!("session-{account_id}"),
            user_id: account_id,
            expire: None,
            current: true,
        })
    }

    async fn get_account(&self) -> Result<Account, BackendError> {
        self.record("get_account")?;
        let state = self.state.lock().unwrap();
        let session = state.session.clone().ok_or(BackendError::Api {
            status: 401,
            message: "no session".into(),
            kind: Some("general_unauthorized_scope".into()),
        })?;
        state
            .accounts
            .iter()
            .find(|(a, _)| a.id == session)
            .map(|(a, _)| a.clone())
            .ok_or_else(|| not_found("account"))
    }

    async fn delete_session(&self, _session_id: &str) -> Result<(), BackendError> {
        self.record("delete_session")?;
        self.state.lock().unwrap().session = None;
        Ok(())
    }

    fn avatar_initials_url(&self, name: &str) -> Result<String, BackendError> {
        self.record("avatar_initials_url")?;
        Ok(format!("mock://avatars/{}", urlencoding::encode(name)))
    }

    async fn create_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, BackendError> {
        self.record("create_document")?;
        Ok(self.seed(collection_id, document_id, data))
    }

    async fn get_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, BackendError> {
        self.record("get_document")?;
        let state = self.state.lock().unwrap();
        state
            .collections
            .get(collection_id)
            .and_then(|docs| docs.iter().find(|d| d.id == document_id))
            .cloned()
            .ok_or_else(|| not_found(document_id))
    }

    async fn list_documents(
        &self,
        _database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList<Document>, BackendError> {
        self.record("list_documents")?;
        let docs = self.documents(collection_id);
        Ok(apply(docs, queries))
    }

    async fn update_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, BackendError> {
        self.record("update_document")?;
        let mut state = self.state.lock().unwrap();
        let now = state.now();
        let doc = state
            .collections
            .get_mut(collection_id)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == document_id))
            .ok_or_else(|| not_found(document_id))?;
        doc.fields.extend(as_map(data));
        doc.updated_at = Some(now);
        Ok(doc.clone())
    }

    async fn delete_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), BackendError> {
        self.record("delete_document")?;
        let mut state = self.state.lock().unwrap();
        let docs = state
            .collections
            .get_mut(collection_id)
            .ok_or_else(|| not_found(collection_id))?;
        let before = docs.len();
        docs.retain(|d| d.id != document_id);
        if docs.len() == before {
            return Err(not_found(document_id));
        }
        Ok(())
    }

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: &FileUpload,
    ) -> Result<StoredFile, BackendError> {
        self.record("create_file")?;
        let stored = StoredFile {
            id: file_id.to_string(),
            bucket_id: bucket_id.to_string(),
            name: file.file_name.clone(),
            mime_type: Some(file.content_type.to_string()),
            size_original: file.bytes.len() as u64,
        };
        let mut state = self.state.lock().unwrap();
        state.files.insert(file_id.to_string(), stored.clone());
        Ok(stored)
    }

    fn file_preview_url(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> Result<String, BackendError> {
        self.record("file_preview_url")?;
        Ok(format!(
            "mock://{bucket_id}/{file_id}/preview?width={}",
            options.width
        ))
    }

    async fn delete_file(&self, _bucket_id: &str, file_id: &str) -> Result<(), BackendError> {
        self.record("delete_file")?;
        let mut state = self.state.lock().unwrap();
        state
            .files
            .remove(file_id)
            .map(|_| ())
            .ok_or_else(|| not_found(file_id))
    }
}
