// src/services/gateway.rs - shared plumbing for the remote data gateway
use std::sync::Arc;

use log::{error, warn};
use thiserror::Error;

use crate::config::BackendConfig;
use crate::repositories::{Backend, BackendError};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0} is required")]
    MissingId(&'static str),
    #[error("no file attached")]
    MissingFile,
    #[error("no user document for account {0}")]
    UserNotFound(String),
}

impl GatewayError {
    /// True when the call was refused before reaching the backend.
    pub fn is_precondition(&self) -> bool {
        matches!(self, GatewayError::MissingId(_) | GatewayError::MissingFile)
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionIds {
    pub database_id: String,
    pub storage_id: String,
    pub user_collection_id: String,
    pub post_collection_id: String,
    pub saves_collection_id: String,
}

impl From<&BackendConfig> for CollectionIds {
    fn from(config: &BackendConfig) -> Self {
        Self {
            database_id: config.database_id.clone(),
            storage_id: config.storage_id.clone(),
            user_collection_id: config.user_collection_id.clone(),
            post_collection_id: config.post_collection_id.clone(),
            saves_collection_id: config.saves_collection_id.clone(),
        }
    }
}

/// Stateless wrappers that turn one intent into backend calls.
///
/// Every public operation logs its own failure before handing it back, so
/// callers only need to decide what to show.
#[derive(Clone)]
pub struct Gateway {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) ids: CollectionIds,
}

impl Gateway {
    pub fn new(backend: Arc<dyn Backend>, ids: CollectionIds) -> Self {
        Self { backend, ids }
    }

    pub fn ids(&self) -> &CollectionIds {
        &self.ids
    }

    /// Best-effort cleanup of an uploaded file. Failures are logged and dropped.
    pub(crate) async fn discard_file(&self, file_id: &str) {
        if let Err(e) = self.backend.delete_file(&self.ids.storage_id, file_id).await {
            warn!("could not delete file {file_id}, leaving it orphaned: {e}");
        }
    }

    /// Passes `result` through, deleting `file_id` first when it is an error.
    pub(crate) async fn or_discard<T>(
        &self,
        file_id: &str,
        result: GatewayResult<T>,
    ) -> GatewayResult<T> {
        if result.is_err() {
            self.discard_file(file_id).await;
        }
        result
    }
}

pub(crate) fn require<'a>(value: &'a str, what: &'static str) -> GatewayResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(GatewayError::MissingId(what))
    } else {
        Ok(value)
    }
}

pub(crate) fn logged<T>(op: &str, result: GatewayResult<T>) -> GatewayResult<T> {
    result.inspect_err(|e| error!("{op} failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_refused() {
        assert!(matches!(
            require("  ", "post id"),
            Err(GatewayError::MissingId("post id"))
        ));
        assert_eq!(require(" p1 ", "post id").unwrap(), "p1");
    }

    #[test]
    fn precondition_errors_are_flagged() {
        assert!(GatewayError::MissingId("user id").is_precondition());
        assert!(GatewayError::MissingFile.is_precondition());
        assert!(!GatewayError::UserNotFound("a1".into()).is_precondition());
    }
}
