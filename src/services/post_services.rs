// src/services/post_services.rs
use serde_json::json;

use super::gateway::{Gateway, GatewayError, GatewayResult, logged, require};
use crate::dtos::post_dtos::PostFields;
use crate::dtos::{FileUpload, NewPost, UpdatePost, parse_tags};
use crate::models::{DocumentList, Post, Save, StoredFile};
use crate::repositories::{PreviewOptions, Query, unique_id};

pub const RECENT_POSTS_LIMIT: u32 = 20;
pub const FEED_PAGE_SIZE: u32 = 9;

impl Gateway {
    pub async fn upload_file(&self, file: &FileUpload) -> GatewayResult<StoredFile> {
        logged("upload_file", self.store_file(file).await)
    }

    pub fn get_file_preview(&self, file_id: &str) -> GatewayResult<String> {
        logged("get_file_preview", self.preview_url(file_id))
    }

    // Unlogged steps; composite operations log once at their own level.
    pub(crate) async fn store_file(&self, file: &FileUpload) -> GatewayResult<StoredFile> {
        self.backend
            .create_file(&self.ids.storage_id, &unique_id(), file)
            .await
            .map_err(GatewayError::from)
    }

    pub(crate) fn preview_url(&self, file_id: &str) -> GatewayResult<String> {
        let file_id = require(file_id, "file id")?;
        self.backend
            .file_preview_url(&self.ids.storage_id, file_id, &PreviewOptions::POST_IMAGE)
            .map_err(GatewayError::from)
    }

    pub async fn delete_file(&self, file_id: &str) -> GatewayResult<()> {
        let result = async {
            let file_id = require(file_id, "file id")?;
            self.backend
                .delete_file(&self.ids.storage_id, file_id)
                .await?;
            Ok::<_, GatewayError>(())
        }
        .await;
        logged("delete_file", result)
    }

    /// Upload, preview, then the post document. A failure after the upload
    /// deletes the uploaded file before returning.
    pub async fn create_post(&self, post: NewPost) -> GatewayResult<Post> {
        let result = async {
            let file = post.file.as_ref().ok_or(GatewayError::MissingFile)?;
            let user_id = require(&post.user_id, "user id")?;

            let uploaded = self.store_file(file).await?;
            let image_url = self
                .or_discard(&uploaded.id, self.preview_url(&uploaded.id))
                .await?;

            let fields = PostFields {
                creator: Some(user_id),
                caption: &post.caption,
                image_url: &image_url,
                image_id: &uploaded.id,
                location: post.location.as_deref(),
                tags: parse_tags(post.tags.as_deref()),
            };
            let created = async {
                let doc = self
                    .backend
                    .create_document(
                        &self.ids.database_id,
                        &self.ids.post_collection_id,
                        &unique_id(),
                        serde_json::to_value(&fields)?,
                    )
                    .await?;
                Ok::<Post, GatewayError>(doc.decode()?)
            }
            .await;

            self.or_discard(&uploaded.id, created).await
        }
        .await;
        logged("create_post", result)
    }

    /// Rewrites caption, location and tags; with a new file also swaps the
    /// image, deleting the old one only once the document update succeeded.
    pub async fn update_post(&self, post: UpdatePost) -> GatewayResult<Post> {
        let result = async {
            let post_id = require(&post.post_id, "post id")?;

            let replacement = match &post.file {
                Some(file) => {
                    let uploaded = self.store_file(file).await?;
                    let url = self
                        .or_discard(&uploaded.id, self.preview_url(&uploaded.id))
                        .await?;
                    Some((uploaded.id, url))
                }
                None => None,
            };
            let (image_id, image_url) = match &replacement {
                Some((id, url)) => (id.as_str(), url.as_str()),
                None => (post.image_id.as_str(), post.image_url.as_str()),
            };

            let fields = PostFields {
                creator: None,
                caption: &post.caption,
                image_url,
                image_id,
                location: post.location.as_deref(),
                tags: parse_tags(post.tags.as_deref()),
            };
            let updated = async {
                let doc = self
                    .backend
                    .update_document(
                        &self.ids.database_id,
                        &self.ids.post_collection_id,
                        post_id,
                        serde_json::to_value(&fields)?,
                    )
                    .await?;
                Ok::<Post, GatewayError>(doc.decode()?)
            }
            .await;

            let updated = match &replacement {
                Some((new_id, _)) => self.or_discard(new_id, updated).await?,
                None => updated?,
            };
            if replacement.is_some() && !post.image_id.trim().is_empty() {
                self.discard_file(&post.image_id).await;
            }
            Ok::<Post, GatewayError>(updated)
        }
        .await;
        logged("update_post", result)
    }

    /// Deletes the post document and then its stored image.
    pub async fn delete_post(&self, post_id: &str, image_id: &str) -> GatewayResult<()> {
        let result = async {
            let post_id = require(post_id, "post id")?;
            let image_id = require(image_id, "image id")?;
            self.backend
                .delete_document(&self.ids.database_id, &self.ids.post_collection_id, post_id)
                .await?;
            self.discard_file(image_id).await;
            Ok::<_, GatewayError>(())
        }
        .await;
        logged("delete_post", result)
    }

    /// Replaces the post's like list with `likes` (user ids).
    pub async fn like_post(&self, post_id: &str, likes: &[String]) -> GatewayResult<Post> {
        let result = async {
            let post_id = require(post_id, "post id")?;
            let doc = self
                .backend
                .update_document(
                    &self.ids.database_id,
                    &self.ids.post_collection_id,
                    post_id,
                    json!({ "likes": likes }),
                )
                .await?;
            Ok::<Post, GatewayError>(doc.decode()?)
        }
        .await;
        logged("like_post", result)
    }

    pub async fn save_post(&self, user_id: &str, post_id: &str) -> GatewayResult<Save> {
        let result = async {
            let user_id = require(user_id, "user id")?;
            let post_id = require(post_id, "post id")?;
            let doc = self
                .backend
                .create_document(
                    &self.ids.database_id,
                    &self.ids.saves_collection_id,
                    &unique_id(),
                    json!({ "user": user_id, "post": post_id }),
                )
                .await?;
            Ok::<Save, GatewayError>(doc.decode()?)
        }
        .await;
        logged("save_post", result)
    }

    pub async fn delete_saved_post(&self, saved_record_id: &str) -> GatewayResult<()> {
        let result = async {
            let saved_record_id = require(saved_record_id, "saved record id")?;
            self.backend
                .delete_document(
                    &self.ids.database_id,
                    &self.ids.saves_collection_id,
                    saved_record_id,
                )
                .await?;
            Ok::<_, GatewayError>(())
        }
        .await;
        logged("delete_saved_post", result)
    }

    pub async fn get_recent_posts(&self) -> GatewayResult<DocumentList<Post>> {
        let queries = [
            Query::order_desc("$createdAt"),
            Query::limit(RECENT_POSTS_LIMIT),
        ];
        let result = self.list_posts(&queries).await;
        logged("get_recent_posts", result)
    }

    /// One feed page, newest update first, starting after `cursor` when given.
    pub async fn get_infinite_posts(&self, cursor: Option<&str>) -> GatewayResult<DocumentList<Post>> {
        let mut queries = vec![Query::order_desc("$updatedAt"), Query::limit(FEED_PAGE_SIZE)];
        if let Some(cursor) = cursor.map(str::trim).filter(|c| !c.is_empty()) {
            queries.push(Query::cursor_after(cursor));
        }
        let result = self.list_posts(&queries).await;
        logged("get_infinite_posts", result)
    }

    pub async fn get_post_by_id(&self, post_id: &str) -> GatewayResult<Post> {
        let result = async {
            let post_id = require(post_id, "post id")?;
            let doc = self
                .backend
                .get_document(&self.ids.database_id, &self.ids.post_collection_id, post_id)
                .await?;
            Ok::<Post, GatewayError>(doc.decode()?)
        }
        .await;
        logged("get_post_by_id", result)
    }

    pub async fn get_user_posts(&self, user_id: &str) -> GatewayResult<DocumentList<Post>> {
        let result = async {
            let user_id = require(user_id, "user id")?;
            self.list_posts(&[
                Query::equal("creator", user_id),
                Query::order_desc("$createdAt"),
            ])
            .await
        }
        .await;
        logged("get_user_posts", result)
    }

    pub async fn search_posts(&self, search_term: &str) -> GatewayResult<DocumentList<Post>> {
        let result = async {
            let term = require(search_term, "search term")?;
            self.list_posts(&[Query::search("caption", term)]).await
        }
        .await;
        logged("search_posts", result)
    }

    async fn list_posts(&self, queries: &[Query]) -> GatewayResult<DocumentList<Post>> {
        let list = self
            .backend
            .list_documents(&self.ids.database_id, &self.ids.post_collection_id, queries)
            .await?;
        Ok(list.decode()?)
    }
}
