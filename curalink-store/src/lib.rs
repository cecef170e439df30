//! Device-local persistence for CuraLink.
//!
//! Everything the client remembers between runs goes through the
//! [`KeyValueStore`] trait: profile data, the account type marker, favorites,
//! and (in a separate session scope) conversation history. Two backends ship
//! with the crate:
//!
//! - [`MemoryStore`]: a concurrent map, used by tests and for throwaway
//!   sessions
//! - [`SqliteStore`]: a `kv` table in SQLite, one row per `(scope, key)`
//!
//! [`JsonStore`] layers typed JSON access on top of either backend, and the
//! [`favorites`] and [`profile`] modules build the domain operations on it.
//!
//! # Examples
//!
//! ```rust
//! use curalink_store::{FavoriteCategory, FavoritesManager, JsonStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> curalink_common::Result<()> {
//! let favorites = FavoritesManager::new(JsonStore::memory());
//! let set = favorites
//!     .toggle_favorite(FavoriteCategory::Trials, "NCT05123456")
//!     .await?;
//! assert_eq!(set.trials, vec!["NCT05123456".to_string()]);
//! # Ok(())
//! # }
//! ```
pub mod backend;
pub mod favorites;
pub mod json;
pub mod memory;
pub mod profile;
pub mod sqlite;

pub use backend::{KeyValueStore, Scope};
pub use favorites::{FavoriteCategory, FavoritesManager, FavoritesSet};
pub use json::JsonStore;
pub use memory::MemoryStore;
pub use profile::{PatientProfile, Profile, ProfileStore, ResearcherProfile};
pub use sqlite::{open_pool, SqliteStore};

/// Keys used in the preference (device-local) scope.
pub mod keys {
    pub const USER_TYPE: &str = "userType";
    pub const PATIENT_DATA: &str = "patientData";
    pub const RESEARCHER_DATA: &str = "researcherData";
    pub const FAVORITES: &str = "favorites";
    pub const USER_ID: &str = "userId";

    /// Session-scope key for the chat widget history.
    pub const CHAT_MESSAGES: &str = "chatMessages";
    /// Session-scope key for forum posts created during this session.
    pub const FORUM_POSTS: &str = "forumPosts";
}
