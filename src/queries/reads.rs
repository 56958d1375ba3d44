use std::sync::Arc;

use futures::FutureExt;
use log::debug;

use super::{PostFeed, Queries, QueryData, QueryResult};
use crate::cache::{Fetcher, QueryError, QueryKey, Subscription};
use crate::models::{DocumentList, Post, User};
use crate::services::GatewayError;

impl Queries {
    /// Registers a live reader of `key`; it is refetched whenever a mutation
    /// invalidates it. Disabled keys (blank id or term) yield `None` and
    /// never reach the gateway.
    pub fn observe(&self, key: QueryKey) -> Option<Subscription<QueryData>> {
        if !key.is_enabled() {
            debug!("{key} disabled, not observing");
            return None;
        }
        let fetcher = self.fetcher(&key);
        Some(self.cache.subscribe(key, fetcher))
    }

    /// Cached read of `key`. `Ok(None)` when the key is disabled.
    pub async fn read(&self, key: QueryKey) -> QueryResult<Option<Arc<QueryData>>> {
        if !key.is_enabled() {
            debug!("{key} disabled, skipping fetch");
            return Ok(None);
        }
        let fetcher = self.fetcher(&key);
        self.cache.fetch(key, fetcher).await.map(Some)
    }

    pub async fn recent_posts(&self) -> QueryResult<DocumentList<Post>> {
        let key = QueryKey::RecentPosts;
        let data = self.read(key.clone()).await?;
        posts(&key, data.as_deref())
    }

    pub async fn post_feed(&self) -> QueryResult<PostFeed> {
        let key = QueryKey::InfinitePosts;
        let data = self.read(key.clone()).await?;
        feed(&key, data.as_deref())
    }

    /// Loads the page after the feed's last post and appends it. Returns the
    /// feed unchanged once the last page came back empty.
    pub async fn fetch_next_feed_page(&self) -> QueryResult<PostFeed> {
        let current = self.post_feed().await?;
        let Some(cursor) = current.next_cursor() else {
            return Ok(current);
        };

        let gateway = Arc::clone(&self.gateway);
        let fetcher: Fetcher<QueryData> = Arc::new(move || {
            let gateway = Arc::clone(&gateway);
            let cursor = cursor.clone();
            let mut feed = current.clone();
            async move {
                let page = gateway.get_infinite_posts(Some(&cursor)).await?;
                feed.push(page);
                Ok::<_, GatewayError>(QueryData::Feed(feed))
            }
            .boxed()
        });

        let key = QueryKey::InfinitePosts;
        let data = self.cache.refetch(key.clone(), fetcher).await?;
        feed(&key, Some(&*data))
    }

    pub async fn post_by_id(&self, post_id: &str) -> QueryResult<Option<Post>> {
        let key = QueryKey::PostById(post_id.to_string());
        match self.read(key.clone()).await? {
            Some(data) => post(&key, &data).map(Some),
            None => Ok(None),
        }
    }

    pub async fn user_posts(&self, user_id: &str) -> QueryResult<Option<DocumentList<Post>>> {
        let key = QueryKey::UserPosts(user_id.to_string());
        match self.read(key.clone()).await? {
            Some(data) => posts(&key, Some(&*data)).map(Some),
            None => Ok(None),
        }
    }

    pub async fn search_posts(&self, search_term: &str) -> QueryResult<Option<DocumentList<Post>>> {
        let key = QueryKey::SearchPosts(search_term.to_string());
        match self.read(key.clone()).await? {
            Some(data) => posts(&key, Some(&*data)).map(Some),
            None => Ok(None),
        }
    }

    pub async fn current_user(&self) -> QueryResult<User> {
        let key = QueryKey::CurrentUser;
        let data = self.read(key.clone()).await?;
        user(&key, data.as_deref())
    }

    pub async fn users(&self, limit: Option<u32>) -> QueryResult<DocumentList<User>> {
        let key = QueryKey::Users(limit);
        match self.read(key.clone()).await?.as_deref() {
            Some(QueryData::Users(list)) => Ok(list.clone()),
            _ => Err(QueryError::Unexpected(key.to_string())),
        }
    }

    pub async fn user_by_id(&self, user_id: &str) -> QueryResult<Option<User>> {
        let key = QueryKey::UserById(user_id.to_string());
        match self.read(key.clone()).await? {
            Some(data) => user(&key, Some(&*data)).map(Some),
            None => Ok(None),
        }
    }
}

fn posts(key: &QueryKey, data: Option<&QueryData>) -> QueryResult<DocumentList<Post>> {
    match data {
        Some(QueryData::Posts(list)) => Ok(list.clone()),
        _ => Err(QueryError::Unexpected(key.to_string())),
    }
}

fn feed(key: &QueryKey, data: Option<&QueryData>) -> QueryResult<PostFeed> {
    match data {
        Some(QueryData::Feed(feed)) => Ok(feed.clone()),
        _ => Err(QueryError::Unexpected(key.to_string())),
    }
}

fn post(key: &QueryKey, data: &QueryData) -> QueryResult<Post> {
    match data {
        QueryData::Post(post) => Ok(post.clone()),
        _ => Err(QueryError::Unexpected(key.to_string())),
    }
}

fn user(key: &QueryKey, data: Option<&QueryData>) -> QueryResult<User> {
    match data {
        Some(QueryData::User(user)) => Ok(user.clone()),
        _ => Err(QueryError::Unexpected(key.to_string())),
    }
}
