use std::sync::{Mutex, MutexGuard};

use log::warn;

/// Locks `lock`, recovering the guard if another task panicked while holding it.
pub(crate) fn mutex_lock<'a, T>(lock: &'a Mutex<T>, op: &'static str) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("recovered poisoned query cache lock during {op}; entries may be stale");
            poisoned.into_inner()
        }
    }
}
