//! Cache keys for every read the client performs.

use std::fmt;

/// Identifies one cached read result. Conceptually an ordered tuple whose
/// first element names the operation and whose rest are its discriminators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    RecentPosts,
    /// Every page of the feed lives under this one key; the page cursor is
    /// not part of it.
    InfinitePosts,
    PostById(String),
    UserPosts(String),
    SearchPosts(String),
    CurrentUser,
    Users(Option<u32>),
    UserById(String),
}

impl QueryKey {
    pub fn kind(&self) -> &'static str {
        match self {
            QueryKey::RecentPosts => "getRecentPosts",
            QueryKey::InfinitePosts => "getInfinitePosts",
            QueryKey::PostById(_) => "getPostById",
            QueryKey::UserPosts(_) => "getUserPosts",
            QueryKey::SearchPosts(_) => "searchPosts",
            QueryKey::CurrentUser => "getCurrentUser",
            QueryKey::Users(_) => "getUsers",
            QueryKey::UserById(_) => "getUserById",
        }
    }

    /// The id or term a parameterized read is keyed on.
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            QueryKey::PostById(id)
            | QueryKey::UserPosts(id)
            | QueryKey::SearchPosts(id)
            | QueryKey::UserById(id) => Some(id),
            _ => None,
        }
    }

    /// Parameterized reads only run with a non-blank discriminator.
    pub fn is_enabled(&self) -> bool {
        match self {
            QueryKey::PostById(_)
            | QueryKey::UserPosts(_)
            | QueryKey::SearchPosts(_)
            | QueryKey::UserById(_) => self
                .discriminator()
                .is_some_and(|value| !value.trim().is_empty()),
            _ => true,
        }
    }

    pub fn segments(&self) -> Vec<String> {
        let mut segments = vec![self.kind().to_string()];
        match self {
            QueryKey::Users(Some(limit)) => segments.push(limit.to_string()),
            other => {
                if let Some(value) = other.discriminator() {
                    segments.push(value.to_string());
                }
            }
        }
        segments
    }

    /// True when `filter`'s tuple is a prefix of this key's tuple.
    pub fn matches(&self, filter: &QueryKey) -> bool {
        let own = self.segments();
        let wanted = filter.segments();
        wanted.len() <= own.len() && own.iter().zip(&wanted).all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join("/"))
    }
}
