use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::Related;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub creator: Option<Related>,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_id: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: Vec<Related>,
    #[serde(default)]
    pub save: Vec<Related>,
}

impl Post {
    pub fn creator_id(&self) -> Option<&str> {
        self.creator.as_ref().map(Related::id)
    }

    /// Ids of the users who liked this post.
    pub fn like_ids(&self) -> Vec<String> {
        self.likes.iter().map(|r| r.id().to_string()).collect()
    }
}
