// src/config.rs
use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Where the backend lives and which of its databases, buckets and
/// collections this client reads and writes.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub storage_id: String,
    pub user_collection_id: String,
    pub post_collection_id: String,
    pub saves_collection_id: String,
    /// Age after which a fresh cache entry counts as stale. `None` keeps
    /// entries fresh until a mutation invalidates them.
    pub cache_stale_after: Option<Duration>,
}

impl BackendConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .with_context(|| format!("{key} not set"))
        };

        let cache_stale_after = match lookup("AIGRAM_CACHE_STALE_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("AIGRAM_CACHE_STALE_SECS is not a number: {raw}"))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            endpoint: required("APPWRITE_URL")?,
            project_id: required("APPWRITE_PROJECT_ID")?,
            database_id: required("APPWRITE_DATABASE_ID")?,
            storage_id: required("APPWRITE_STORAGE_ID")?,
            user_collection_id: required("APPWRITE_USER_COLLECTION_ID")?,
            post_collection_id: required("APPWRITE_POST_COLLECTION_ID")?,
            saves_collection_id: required("APPWRITE_SAVES_COLLECTION_ID")?,
            cache_stale_after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("APPWRITE_URL", "https://cloud.example.io/v1"),
            ("APPWRITE_PROJECT_ID", "proj"),
            ("APPWRITE_DATABASE_ID", "db"),
            ("APPWRITE_STORAGE_ID", "media"),
            ("APPWRITE_USER_COLLECTION_ID", "users"),
            ("APPWRITE_POST_COLLECTION_ID", "posts"),
            ("APPWRITE_SAVES_COLLECTION_ID", "saves"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            map.insert(k.to_string(), v.to_string());
        }
        map
    }

    #[test]
    fn loads_all_ids() {
        let map = vars(&[]);
        let cfg = BackendConfig::from_lookup(|k| map.get(k).cloned()).unwrap();
        assert_eq!(cfg.post_collection_id, "posts");
        assert_eq!(cfg.storage_id, "media");
        assert_eq!(cfg.cache_stale_after, None);
    }

    #[test]
    fn missing_id_names_the_variable() {
        let mut map = vars(&[]);
        map.remove("APPWRITE_SAVES_COLLECTION_ID");
        let err = BackendConfig::from_lookup(|k| map.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("APPWRITE_SAVES_COLLECTION_ID"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let map = vars(&[("APPWRITE_PROJECT_ID", "  ")]);
        assert!(BackendConfig::from_lookup(|k| map.get(k).cloned()).is_err());
    }

    #[test]
    fn stale_window_is_parsed() {
        let map = vars(&[("AIGRAM_CACHE_STALE_SECS", "30")]);
        let cfg = BackendConfig::from_lookup(|k| map.get(k).cloned()).unwrap();
        assert_eq!(cfg.cache_stale_after, Some(Duration::from_secs(30)));

        let bad = vars(&[("AIGRAM_CACHE_STALE_SECS", "soon")]);
        assert!(BackendConfig::from_lookup(|k| bad.get(k).cloned()).is_err());
    }
}
