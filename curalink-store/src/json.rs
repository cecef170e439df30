use crate::backend::KeyValueStore;
use crate::memory::MemoryStore;
use curalink_common::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Typed JSON access over any [`KeyValueStore`].
#[derive(Clone)]
pub struct JsonStore {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for JsonStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonStore")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl JsonStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// A fresh in-memory store, handy for tests and one-off sessions.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn get_json<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.backend.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set_json<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(value)?;
        self.backend.set(key, &payload).await
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.backend.remove(key).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await
    }
}
