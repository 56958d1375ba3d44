// src/services/auth_services.rs
use serde_json::json;

use super::gateway::{Gateway, GatewayError, GatewayResult, logged};
use crate::dtos::{NewUser, NewUserDocument, SignInIn};
use crate::models::{Account, Session, User};
use crate::repositories::{Query, unique_id};

impl Gateway {
    /// Creates the auth account, then the matching users-collection document
    /// with an initials avatar.
    pub async fn create_user_account(&self, user: NewUser) -> GatewayResult<User> {
        let result = async {
            let account = self
                .backend
                .create_account(&unique_id(), &user.email, &user.password, &user.name)
                .await?;
            let image_url = self.backend.avatar_initials_url(&user.name)?;

            self.insert_user_document(NewUserDocument {
                account_id: account.id,
                name: account.name,
                email: account.email,
                username: user.username,
                image_url,
            })
            .await
        }
        .await;
        logged("create_user_account", result)
    }

    pub async fn save_user_to_db(&self, user: NewUserDocument) -> GatewayResult<User> {
        logged("save_user_to_db", self.insert_user_document(user).await)
    }

    async fn insert_user_document(&self, user: NewUserDocument) -> GatewayResult<User> {
        let doc = self
            .backend
            .create_document(
                &self.ids.database_id,
                &self.ids.user_collection_id,
                &unique_id(),
                serde_json::to_value(&user)?,
            )
            .await?;
        Ok(doc.decode()?)
    }

    pub async fn sign_in_account(&self, credentials: SignInIn) -> GatewayResult<Session> {
        let result = self
            .backend
            .create_email_session(&credentials.email, &credentials.password)
            .await
            .map_err(GatewayError::from);
        logged("sign_in_account", result)
    }

    pub async fn get_account(&self) -> GatewayResult<Account> {
        let result = self.backend.get_account().await.map_err(GatewayError::from);
        logged("get_account", result)
    }

    /// The users-collection document of whoever holds the current session.
    pub async fn get_current_user(&self) -> GatewayResult<User> {
        let result = async {
            let account = self.backend.get_account().await?;
            let list = self
                .backend
                .list_documents(
                    &self.ids.database_id,
                    &self.ids.user_collection_id,
                    &[Query::equal("accountId", json!(account.id))],
                )
                .await?;
            let doc = list
                .documents
                .first()
                .ok_or_else(|| GatewayError::UserNotFound(account.id.clone()))?;
            Ok::<_, GatewayError>(doc.decode()?)
        }
        .await;
        logged("get_current_user", result)
    }

    pub async fn sign_out_account(&self) -> GatewayResult<()> {
        let result = self
            .backend
            .delete_session("current")
            .await
            .map_err(GatewayError::from);
        logged("sign_out_account", result)
    }
}
