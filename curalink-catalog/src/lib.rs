//! Medical entity catalog: researchers, publications and clinical trials.
//!
//! The [`SearchService`] trait is the seam between the front end and whatever
//! index answers queries. [`MockSearchService`] filters a static sample set by
//! case-insensitive substring match after a fixed delay. The crate also holds
//! the forum board ([`forum`]) and the plain-text favorites export
//! ([`summary`]).
//!
//! # Examples
//!
//! ```rust
//! use curalink_catalog::{MockSearchService, SearchContext, SearchService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> curalink_common::Result<()> {
//! let search = MockSearchService::instant();
//! let trials = search
//!     .search_clinical_trials("gait", &SearchContext::default())
//!     .await?;
//! assert_eq!(trials[0].id, "NCT05123458");
//! # Ok(())
//! # }
//! ```
pub mod data;
pub mod forum;
pub mod mock;
pub mod summary;
pub mod types;

pub use forum::{ForumBoard, ForumPost, NewPost};
pub use mock::MockSearchService;
pub use summary::render_summary;
pub use types::{
    ClinicalTrial, Publication, Researcher, SearchContext, SearchResults, Searchable,
};

use async_trait::async_trait;
use curalink_common::Result;
use curalink_store::{FavoriteCategory, FavoritesSet};
use tracing::info;

#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search_researchers(&self, query: &str, ctx: &SearchContext)
        -> Result<Vec<Researcher>>;

    async fn search_publications(
        &self,
        query: &str,
        ctx: &SearchContext,
    ) -> Result<Vec<Publication>>;

    async fn search_clinical_trials(
        &self,
        query: &str,
        ctx: &SearchContext,
    ) -> Result<Vec<ClinicalTrial>>;

    /// Run the three lookups concurrently.
    async fn search_all(&self, query: &str, ctx: &SearchContext) -> Result<SearchResults> {
        let (researchers, publications, trials) = tokio::join!(
            self.search_researchers(query, ctx),
            self.search_publications(query, ctx),
            self.search_clinical_trials(query, ctx),
        );
        let results = SearchResults {
            researchers: researchers?,
            publications: publications?,
            trials: trials?,
        };
        info!(query, hits = results.len(), "search.all");
        Ok(results)
    }
}

fn keep_favorites<T: Searchable>(
    items: Vec<T>,
    favorites: &FavoritesSet,
    category: FavoriteCategory,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| favorites.contains(category, item.id()))
        .collect()
}

/// Look up the favorited entities, in catalog order. Ids with no matching
/// entity are skipped.
pub async fn resolve_favorites<S>(service: &S, favorites: &FavoritesSet) -> Result<SearchResults>
where
    S: SearchService + ?Sized,
{
    let everything = service.search_all("", &SearchContext::default()).await?;
    Ok(SearchResults {
        researchers: keep_favorites(
            everything.researchers,
            favorites,
            FavoriteCategory::Researchers,
        ),
        publications: keep_favorites(
            everything.publications,
            favorites,
            FavoriteCategory::Publications,
        ),
        trials: keep_favorites(everything.trials, favorites, FavoriteCategory::Trials),
    })
}
