use log::info;

use super::{Queries, QueryResult};
use crate::cache::QueryKey;
use crate::dtos::{NewPost, NewUser, SignInIn, UpdatePost, UpdateUser};
use crate::models::{Post, Save, Session, User};

/// A successful write, carrying the ids its invalidations depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateUserAccount,
    SignIn,
    SignOut,
    CreatePost,
    UpdatePost { post_id: String },
    DeletePost,
    LikePost { post_id: String },
    SavePost,
    DeleteSavedPost,
    UpdateUser { user_id: String },
}

/// Keys that stop being trustworthy once `mutation` has succeeded.
pub fn invalidated_by(mutation: &Mutation) -> Vec<QueryKey> {
    match mutation {
        Mutation::CreateUserAccount | Mutation::SignIn | Mutation::SignOut => Vec::new(),
        Mutation::CreatePost | Mutation::DeletePost => vec![QueryKey::RecentPosts],
        Mutation::UpdatePost { post_id } => vec![QueryKey::PostById(post_id.clone())],
        Mutation::LikePost { post_id } => vec![
            QueryKey::PostById(post_id.clone()),
            QueryKey::RecentPosts,
            QueryKey::InfinitePosts,
            QueryKey::CurrentUser,
        ],
        Mutation::SavePost | Mutation::DeleteSavedPost => vec![
            QueryKey::RecentPosts,
            QueryKey::InfinitePosts,
            QueryKey::CurrentUser,
        ],
        Mutation::UpdateUser { user_id } => vec![
            QueryKey::CurrentUser,
            QueryKey::UserById(user_id.clone()),
        ],
    }
}

impl Queries {
    fn settled(&self, mutation: Mutation) {
        let keys = invalidated_by(&mutation);
        if keys.is_empty() {
            return;
        }
        let touched = self.cache.invalidate(&keys);
        info!("{mutation:?} invalidated {touched} cached reads");
    }

    pub async fn create_user_account(&self, user: NewUser) -> QueryResult<User> {
        let created = self.gateway.create_user_account(user).await?;
        self.settled(Mutation::CreateUserAccount);
        Ok(created)
    }

    pub async fn sign_in_account(&self, credentials: SignInIn) -> QueryResult<Session> {
        let session = self.gateway.sign_in_account(credentials).await?;
        self.settled(Mutation::SignIn);
        Ok(session)
    }

    pub async fn sign_out_account(&self) -> QueryResult<()> {
        self.gateway.sign_out_account().await?;
        self.settled(Mutation::SignOut);
        Ok(())
    }

    pub async fn create_post(&self, post: NewPost) -> QueryResult<Post> {
        let created = self.gateway.create_post(post).await?;
        self.settled(Mutation::CreatePost);
        Ok(created)
    }

    pub async fn update_post(&self, post: UpdatePost) -> QueryResult<Post> {
        let updated = self.gateway.update_post(post).await?;
        self.settled(Mutation::UpdatePost {
            post_id: updated.id.clone(),
        });
        Ok(updated)
    }

    pub async fn delete_post(&self, post_id: &str, image_id: &str) -> QueryResult<()> {
        self.gateway.delete_post(post_id, image_id).await?;
        self.settled(Mutation::DeletePost);
        Ok(())
    }

    pub async fn like_post(&self, post_id: &str, likes: &[String]) -> QueryResult<Post> {
        let liked = self.gateway.like_post(post_id, likes).await?;
        self.settled(Mutation::LikePost {
            post_id: liked.id.clone(),
        });
        Ok(liked)
    }

    pub async fn save_post(&self, user_id: &str, post_id: &str) -> QueryResult<Save> {
        let saved = self.gateway.save_post(user_id, post_id).await?;
        self.settled(Mutation::SavePost);
        Ok(saved)
    }

    pub async fn delete_saved_post(&self, saved_record_id: &str) -> QueryResult<()> {
        self.gateway.delete_saved_post(saved_record_id).await?;
        self.settled(Mutation::DeleteSavedPost);
        Ok(())
    }

    pub async fn update_user(&self, user: UpdateUser) -> QueryResult<User> {
        let updated = self.gateway.update_user(user).await?;
        self.settled(Mutation::UpdateUser {
            user_id: updated.id.clone(),
        });
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidation_table() {
        let post = || "p1".to_string();
        let cases = vec![
            (Mutation::CreateUserAccount, vec![]),
            (Mutation::SignIn, vec![]),
            (Mutation::SignOut, vec![]),
            (Mutation::CreatePost, vec![QueryKey::RecentPosts]),
            (
                Mutation::UpdatePost { post_id: post() },
                vec![QueryKey::PostById(post())],
            ),
            (Mutation::DeletePost, vec![QueryKey::RecentPosts]),
            (
                Mutation::LikePost { post_id: post() },
                vec![
                    QueryKey::PostById(post()),
                    QueryKey::RecentPosts,
                    QueryKey::InfinitePosts,
                    QueryKey::CurrentUser,
                ],
            ),
            (
                Mutation::SavePost,
                vec![QueryKey::RecentPosts, QueryKey::InfinitePosts, QueryKey::CurrentUser],
            ),
            (
                Mutation::DeleteSavedPost,
                vec![QueryKey::RecentPosts, QueryKey::InfinitePosts, QueryKey::CurrentUser],
            ),
            (
                Mutation::UpdateUser { user_id: "u1".into() },
                vec![QueryKey::CurrentUser, QueryKey::UserById("u1".into())],
            ),
        ];

        for (mutation, expected) in cases {
            assert_eq!(invalidated_by(&mutation), expected, "{mutation:?}");
        }
    }

    #[test]
    fn no_mutation_touches_search_or_user_posts() {
        let all = [
            Mutation::CreatePost,
            Mutation::DeletePost,
            Mutation::LikePost { post_id: "p1".into() },
            Mutation::SavePost,
            Mutation::DeleteSavedPost,
        ];
        for mutation in all {
            for key in invalidated_by(&mutation) {
                assert!(!matches!(key, QueryKey::SearchPosts(_) | QueryKey::UserPosts(_)));
            }
        }
    }
}
