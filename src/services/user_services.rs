// src/services/user_services.rs
use super::gateway::{Gateway, GatewayError, GatewayResult, logged, require};
use crate::dtos::UpdateUser;
use crate::dtos::user_dtos::UserFields;
use crate::models::{DocumentList, User};
use crate::repositories::Query;

impl Gateway {
    pub async fn get_users(&self, limit: Option<u32>) -> GatewayResult<DocumentList<User>> {
        let result = async {
            let mut queries = vec![Query::order_desc("$createdAt")];
            if let Some(limit) = limit {
                queries.push(Query::limit(limit));
            }
            let list = self
                .backend
                .list_documents(&self.ids.database_id, &self.ids.user_collection_id, &queries)
                .await?;
            Ok::<DocumentList<User>, GatewayError>(list.decode()?)
        }
        .await;
        logged("get_users", result)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> GatewayResult<User> {
        let result = async {
            let user_id = require(user_id, "user id")?;
            let doc = self
                .backend
                .get_document(&self.ids.database_id, &self.ids.user_collection_id, user_id)
                .await?;
            Ok::<User, GatewayError>(doc.decode()?)
        }
        .await;
        logged("get_user_by_id", result)
    }

    /// Same shape as a post update: an optional new avatar is uploaded first
    /// and the previous one deleted only after the document is written.
    pub async fn update_user(&self, user: UpdateUser) -> GatewayResult<User> {
        let result = async {
            let user_id = require(&user.user_id, "user id")?;

            let replacement = match &user.file {
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
                Some((id, url)) => (Some(id.as_str()), Some(url.as_str())),
                None => (user.image_id.as_deref(), user.image_url.as_deref()),
            };

            let fields = UserFields {
                name: &user.name,
                bio: &user.bio,
                image_url,
                image_id,
            };
            let updated = async {
                let doc = self
                    .backend
                    .update_document(
                        &self.ids.database_id,
                        &self.ids.user_collection_id,
                        user_id,
                        serde_json::to_value(&fields)?,
                    )
                    .await?;
                Ok::<User, GatewayError>(doc.decode()?)
            }
            .await;

            let updated = match &replacement {
                Some((new_id, _)) => self.or_discard(new_id, updated).await?,
                None => updated?,
            };
            if let (Some(_), Some(old_id)) = (&replacement, user.image_id.as_deref()) {
                if !old_id.trim().is_empty() {
                    self.discard_file(old_id).await;
                }
            }
            Ok::<User, GatewayError>(updated)
        }
        .await;
        logged("update_user", result)
    }
}
