use crate::backend::KeyValueStore;
use async_trait::async_trait;
use curalink_common::Result;
use dashmap::DashMap;
use std::sync::Arc;

/// In-process store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_entries() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.set("k", "v").await.unwrap();
        assert_eq!(b.get("k").await.unwrap().as_deref(), Some("v"));

        b.clear().await.unwrap();
        assert!(a.is_empty());
    }

    #[tokio::test]
    async fn set_overwrites_whole_value() {
        let store = MemoryStore::new();
        store.set("favorites", "{\"a\":1}").await.unwrap();
        store.set("favorites", "{}").await.unwrap();
        assert_eq!(store.get("favorites").await.unwrap().as_deref(), Some("{}"));
        store.remove("favorites").await.unwrap();
        assert!(store.get("favorites").await.unwrap().is_none());
    }
}
