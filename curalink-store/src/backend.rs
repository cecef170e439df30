use async_trait::async_trait;
use curalink_common::Result;
use std::fmt;

/// Lifetime class of stored values.
///
/// `Local` survives restarts until an explicit clear (logout). `Session`
/// holds conversation state and is cleared independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Local,
    Session,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Session => "session",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// String-keyed, string-valued persistent map.
///
/// Writes replace the whole value for a key; there is no compare-and-swap, so
/// two writers racing on the same key resolve as last write wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Drop every key held by this store.
    async fn clear(&self) -> Result<()>;

    /// Short backend label for logs.
    fn backend_name(&self) -> &'static str;
}
