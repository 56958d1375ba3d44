use std::time::Duration;

use crate::config::BackendConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Fresh entries older than this are treated as stale. `None` means only
    /// invalidation makes an entry stale.
    pub stale_after: Option<Duration>,
}

impl From<&BackendConfig> for CacheConfig {
    fn from(config: &BackendConfig) -> Self {
        Self {
            stale_after: config.cache_stale_after,
        }
    }
}
