//! Favorited entity ids, grouped by category.
//!
//! The whole [`FavoritesSet`] lives under one key and is rewritten on every
//! toggle. An id appears at most once per category.
use crate::json::JsonStore;
use crate::keys;
use curalink_common::{CuralinkError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteCategory {
    Researchers,
    Publications,
    Trials,
}

impl FavoriteCategory {
    pub const ALL: [FavoriteCategory; 3] = [
        FavoriteCategory::Researchers,
        FavoriteCategory::Publications,
        FavoriteCategory::Trials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteCategory::Researchers => "researchers",
            FavoriteCategory::Publications => "publications",
            FavoriteCategory::Trials => "trials",
        }
    }
}

impl fmt::Display for FavoriteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FavoriteCategory {
    type Err = CuralinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "researchers" | "researcher" | "experts" => Ok(FavoriteCategory::Researchers),
            "publications" | "publication" => Ok(FavoriteCategory::Publications),
            "trials" | "trial" => Ok(FavoriteCategory::Trials),
            other => Err(CuralinkError::InvalidInput(format!(
                "unknown favorites category: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesSet {
    #[serde(default)]
    pub researchers: Vec<String>,
    #[serde(default)]
    pub publications: Vec<String>,
    #[serde(default)]
    pub trials: Vec<String>,
}

impl FavoritesSet {
    pub fn ids(&self, category: FavoriteCategory) -> &[String] {
        match category {
            FavoriteCategory::Researchers => &self.researchers,
            FavoriteCategory::Publications => &self.publications,
            FavoriteCategory::Trials => &self.trials,
        }
    }

    fn ids_mut(&mut self, category: FavoriteCategory) -> &mut Vec<String> {
        match category {
            FavoriteCategory::Researchers => &mut self.researchers,
            FavoriteCategory::Publications => &mut self.publications,
            FavoriteCategory::Trials => &mut self.trials,
        }
    }

    pub fn contains(&self, category: FavoriteCategory, id: &str) -> bool {
        self.ids(category).iter().any(|existing| existing == id)
    }

    /// Remove `id` if present, otherwise append it. Returns whether the id is
    /// a favorite after the call.
    pub fn toggle(&mut self, category: FavoriteCategory, id: &str) -> bool {
        let ids = self.ids_mut(category);
        match ids.iter().position(|existing| existing == id) {
            Some(index) => {
                ids.remove(index);
                false
            }
            None => {
                ids.push(id.to_string());
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.researchers.len() + self.publications.len() + self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collapse repeated ids, keeping the first occurrence. Returns how many
    /// entries were dropped.
    fn dedup(&mut self) -> usize {
        FavoriteCategory::ALL
            .iter()
            .map(|category| {
                let ids = self.ids_mut(*category);
                let before = ids.len();
                let mut seen = HashSet::new();
                ids.retain(|id| seen.insert(id.clone()));
                before - ids.len()
            })
            .sum()
    }
}

/// Reads and toggles the persisted [`FavoritesSet`].
#[derive(Clone, Debug)]
pub struct FavoritesManager {
    store: JsonStore,
}

impl FavoritesManager {
    pub fn new(store: JsonStore) -> Self {
        Self { store }
    }

    /// Current favorites; an absent or unreadable value yields the empty
    /// structure.
    pub async fn get_favorites(&self) -> Result<FavoritesSet> {
        let mut set: FavoritesSet = match self.store.get_json(keys::FAVORITES).await {
            Ok(found) => found.unwrap_or_default(),
            Err(CuralinkError::Serialization(e)) => {
                warn!(error = %e, "favorites.unreadable_reset");
                FavoritesSet::default()
            }
            Err(e) => return Err(e),
        };
        let dropped = set.dedup();
        if dropped > 0 {
            warn!(dropped, "favorites.duplicates_collapsed");
        }
        Ok(set)
    }

    pub async fn toggle_favorite(
        &self,
        category: FavoriteCategory,
        id: &str,
    ) -> Result<FavoritesSet> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CuralinkError::InvalidInput(
                "favorite id must not be blank".into(),
            ));
        }

        let mut set = self.get_favorites().await?;
        let added = set.toggle(category, id);
        self.store.set_json(keys::FAVORITES, &set).await?;

        info!(%category, id, added, total = set.len(), "favorites.toggle");
        Ok(set)
    }

    pub async fn is_favorite(&self, category: FavoriteCategory, id: &str) -> Result<bool> {
        Ok(self.get_favorites().await?.contains(category, id))
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(keys::FAVORITES).await
    }
}
