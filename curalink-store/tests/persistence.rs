use curalink_store::{
    open_pool, FavoriteCategory, FavoritesManager, JsonStore, KeyValueStore, Scope, SqliteStore,
};
use std::sync::Arc;
use tempfile::TempDir;

fn db_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("curalink.db").display())
}

async fn favorites_at(url: &str) -> FavoritesManager {
    let pool = open_pool(url).await.unwrap();
    FavoritesManager::new(JsonStore::new(Arc::new(SqliteStore::new(pool, Scope::Local))))
}

#[tokio::test]
async fn favorites_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let url = db_url(&dir);

    let before = {
        let favorites = favorites_at(&url).await;
        favorites
            .toggle_favorite(FavoriteCategory::Researchers, "1")
            .await
            .unwrap();
        favorites
            .toggle_favorite(FavoriteCategory::Trials, "NCT05123456")
            .await
            .unwrap()
    };

    let reopened = favorites_at(&url).await;
    let after = reopened.get_favorites().await.unwrap();
    assert_eq!(after, before);
    assert_eq!(after.researchers, vec!["1"]);
    assert_eq!(after.trials, vec!["NCT05123456"]);
}

#[tokio::test]
async fn toggling_twice_restores_the_original_set() {
    let favorites = FavoritesManager::new(JsonStore::memory());
    favorites
        .toggle_favorite(FavoriteCategory::Publications, "2")
        .await
        .unwrap();
    let original = favorites.get_favorites().await.unwrap();

    favorites
        .toggle_favorite(FavoriteCategory::Publications, "3")
        .await
        .unwrap();
    let restored = favorites
        .toggle_favorite(FavoriteCategory::Publications, "3")
        .await
        .unwrap();

    assert_eq!(restored, original);
}

#[tokio::test]
async fn corrupt_favorites_read_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_pool(&db_url(&dir)).await.unwrap();
    let raw = SqliteStore::new(pool.clone(), Scope::Local);
    raw.set("favorites", "not json at all").await.unwrap();

    let favorites = FavoritesManager::new(JsonStore::new(Arc::new(raw)));
    assert!(favorites.get_favorites().await.unwrap().is_empty());

    let set = favorites
        .toggle_favorite(FavoriteCategory::Trials, "NCT05123456")
        .await
        .unwrap();
    assert_eq!(set.trials, vec!["NCT05123456"]);
}

#[tokio::test]
async fn duplicated_ids_are_collapsed_on_read() {
    let backend = Arc::new(curalink_store::MemoryStore::new());
    backend
        .set("favorites", r#"{"researchers":["1","1","2"]}"#)
        .await
        .unwrap();
    let favorites = FavoritesManager::new(JsonStore::new(backend));

    let set = favorites.get_favorites().await.unwrap();
    assert_eq!(set.researchers, vec!["1", "2"]);
    assert!(favorites
        .is_favorite(FavoriteCategory::Researchers, "2")
        .await
        .unwrap());
}

#[tokio::test]
async fn blank_id_is_rejected() {
    let favorites = FavoritesManager::new(JsonStore::memory());
    assert!(favorites
        .toggle_favorite(FavoriteCategory::Trials, "   ")
        .await
        .is_err());
    assert!(favorites.get_favorites().await.unwrap().is_empty());
}
