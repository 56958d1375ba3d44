// src/repositories/appwrite_repo.rs
use async_trait::async_trait;
use log::debug;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use urlencoding::encode;

use super::backend::{Backend, BackendError, PreviewOptions, Query};
use crate::config::BackendConfig;
use crate::dtos::FileUpload;
use crate::models::{Account, Document, DocumentList, Session, StoredFile};

const RESPONSE_FORMAT: &str = "1.5.0";

/// Backend implementation over the platform's REST API. The session cookie
/// set by sign-in is kept in the client's cookie store.
#[derive(Clone)]
pub struct AppwriteBackend {
    client: Client,
    endpoint: String,
    project_id: String,
}

impl AppwriteBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent("aigram/0.1")
            .cookie_store(true)
            .build()?;
        Ok(Self::with_client(client, &config.endpoint, &config.project_id))
    }

    pub fn with_client(client: Client, endpoint: &str, project_id: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn documents_url(&self, database_id: &str, collection_id: &str) -> String {
        self.url(&format!(
            "/databases/{}/collections/{}/documents",
            encode(database_id),
            encode(collection_id)
        ))
    }

    fn document_url(&self, database_id: &str, collection_id: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            self.documents_url(database_id, collection_id),
            encode(document_id)
        )
    }

    fn files_url(&self, bucket_id: &str) -> String {
        self.url(&format!("/storage/buckets/{}/files", encode(bucket_id)))
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Appwrite-Response-Format",
            HeaderValue::from_static(RESPONSE_FORMAT),
        );
        if let Ok(project) = HeaderValue::from_str(&self.project_id) {
            headers.insert("X-Appwrite-Project", project);
        }
        headers
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.headers(self.headers()).send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("backend responded {}", status);

        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn send_empty(&self, request: reqwest::RequestBuilder) -> Result<(), BackendError> {
        let response = request.headers(self.headers()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(api_error(status, &text));
        }
        Ok(())
    }
}

/// Error bodies look like `{"message": "...", "code": 404, "type": "document_not_found"}`.
fn api_error(status: StatusCode, body: &str) -> BackendError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());
    let kind = parsed
        .as_ref()
        .and_then(|v| v.get("type"))
        .and_then(Value::as_str)
        .map(str::to_string);

    BackendError::Api {
        status: status.as_u16(),
        message,
        kind,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDocumentBody<'a> {
    document_id: &'a str,
    data: Value,
}

#[async_trait]
impl Backend for AppwriteBackend {
    async fn create_account(
        &self,
        account_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, BackendError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Body<'a> {
            user_id: &'a str,
            email: &'a str,
            password: &'a str,
            name: &'a str,
        }

        let body = Body {
            user_id: account_id,
            email: email.trim(),
            password,
            name,
        };
        self.send_json(self.client.post(self.url("/account")).json(&body))
            .await
    }

    async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        let body = Body {
            email: email.trim(),
            password,
        };
        self.send_json(
            self.client
                .post(self.url("/account/sessions/email"))
                .json(&body),
        )
        .await
    }

    async fn get_account(&self) -> Result<Account, BackendError> {
        self.send_json(self.client.get(self.url("/account"))).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError> {
        let url = self.url(&format!("/account/sessions/{}", encode(session_id)));
        self.send_empty(self.client.delete(url)).await
    }

    fn avatar_initials_url(&self, name: &str) -> Result<String, BackendError> {
        let url = Url::parse_with_params(
            &self.url("/avatars/initials"),
            &[("name", name), ("project", self.project_id.as_str())],
        )
        .map_err(|e| BackendError::Url(e.to_string()))?;
        Ok(url.to_string())
    }

    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, BackendError> {
        let body = CreateDocumentBody { document_id, data };
        self.send_json(
            self.client
                .post(self.documents_url(database_id, collection_id))
                .json(&body),
        )
        .await
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, BackendError> {
        self.send_json(
            self.client
                .get(self.document_url(database_id, collection_id, document_id)),
        )
        .await
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList<Document>, BackendError> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.to_json()))
            .collect();
        self.send_json(
            self.client
                .get(self.documents_url(database_id, collection_id))
                .query(&params),
        )
        .await
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, BackendError> {
        self.send_json(
            self.client
                .patch(self.document_url(database_id, collection_id, document_id))
                .json(&serde_json::json!({ "data": data })),
        )
        .await
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), BackendError> {
        self.send_empty(
            self.client
                .delete(self.document_url(database_id, collection_id, document_id)),
        )
        .await
    }

    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: &FileUpload,
    ) -> Result<StoredFile, BackendError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(file.content_type.as_ref())?;
        let form = Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);

        let mut headers = self.headers();
        // reqwest sets the multipart boundary itself
        headers.remove(CONTENT_TYPE);

        let response = self
            .client
            .post(self.files_url(bucket_id))
            .headers(headers)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn file_preview_url(
        &self,
        bucket_id: &str,
        file_id: &str,
        options: &PreviewOptions,
    ) -> Result<String, BackendError> {
        let base = format!("{}/{}/preview", self.files_url(bucket_id), encode(file_id));
        let url = Url::parse_with_params(
            &base,
            &[
                ("width", options.width.to_string()),
                ("height", options.height.to_string()),
                ("gravity", options.gravity.to_string()),
                ("quality", options.quality.to_string()),
                ("project", self.project_id.clone()),
            ],
        )
        .map_err(|e| BackendError::Url(e.to_string()))?;
        Ok(url.to_string())
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<(), BackendError> {
        let url = format!("{}/{}", self.files_url(bucket_id), encode(file_id));
        self.send_empty(self.client.delete(url)).await
    }
}
