//! Queries and mutations over the gateway.
//!
//! Every read goes through the [`QueryCache`] under its [`QueryKey`]; every
//! mutation invalidates the keys listed by [`invalidated_by`] once it succeeds.

mod feed;
mod mutations;
mod reads;

use std::sync::Arc;

use futures::FutureExt;

use crate::cache::{Fetcher, QueryCache, QueryError, QueryKey};
use crate::models::{DocumentList, Post, User};
use crate::services::{Gateway, GatewayResult};

pub use feed::{PostFeed, next_cursor};
pub use mutations::{Mutation, invalidated_by};

pub type QueryResult<T> = Result<T, QueryError>;

/// What a cache entry holds, one variant per read shape.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Posts(DocumentList<Post>),
    Feed(PostFeed),
    Post(Post),
    Users(DocumentList<User>),
    User(User),
}

#[derive(Clone)]
pub struct Queries {
    gateway: Arc<Gateway>,
    cache: QueryCache<QueryData>,
}

impl Queries {
    pub fn new(gateway: Gateway, cache: QueryCache<QueryData>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            cache,
        }
    }

    pub fn cache(&self) -> &QueryCache<QueryData> {
        &self.cache
    }

    /// The gateway call that (re)loads `key`.
    pub(crate) fn fetcher(&self, key: &QueryKey) -> Fetcher<QueryData> {
        let gateway = Arc::clone(&self.gateway);
        let key = key.clone();
        Arc::new(move || {
            let gateway = Arc::clone(&gateway);
            let key = key.clone();
            async move { load(&gateway, &key).await }.boxed()
        })
    }
}

async fn load(gateway: &Gateway, key: &QueryKey) -> GatewayResult<QueryData> {
    match key {
        QueryKey::RecentPosts => gateway.get_recent_posts().await.map(QueryData::Posts),
        QueryKey::InfinitePosts => gateway
            .get_infinite_posts(None)
            .await
            .map(|page| QueryData::Feed(PostFeed::first(page))),
        QueryKey::PostById(id) => gateway.get_post_by_id(id).await.map(QueryData::Post),
        QueryKey::UserPosts(id) => gateway.get_user_posts(id).await.map(QueryData::Posts),
        QueryKey::SearchPosts(term) => gateway.search_posts(term).await.map(QueryData::Posts),
        QueryKey::CurrentUser => gateway.get_current_user().await.map(QueryData::User),
        QueryKey::Users(limit) => gateway.get_users(*limit).await.map(QueryData::Users),
        QueryKey::UserById(id) => gateway.get_user_by_id(id).await.map(QueryData::User),
    }
}
