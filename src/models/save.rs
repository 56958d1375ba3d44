use serde::{Deserialize, Serialize};

use super::document::Related;

/// Bookmark join record between a user and a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Save {
    #[serde(rename = "$id")]
    pub id: String,
    /// Absent when the record is nested under its user.
    #[serde(default)]
    pub user: Option<Related>,
    pub post: Related,
}

/// A file held in a storage bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub bucket_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size_original: u64,
}
