use hashbrown::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Names of regions whose geometry is being prepared off-thread. Shared with
/// loader workers; the lock is only held to insert, remove or query a name.
#[derive(Clone, Debug, Default)]
pub struct PendingMappings {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl PendingMappings {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        // A panicking worker cannot leave the set half-updated.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns false if `name` was already pending.
    pub fn insert(&self, name: &str) -> bool {
        self.lock().insert(name.to_string())
    }

    pub fn remove(&self, name: &str) -> bool {
        self.lock().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
